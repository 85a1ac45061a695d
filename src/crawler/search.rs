//! Search URL construction

use url::Url;

/// Builds the results URL for `term` at 1-based `page`
///
/// The search path is appended to whatever path `base_url` already has, and the
/// term is percent-encoded as the `q` query parameter.
///
/// # Example
///
/// ```
/// use product_scraper::crawler::search_url;
///
/// let url = search_url("https://www.flipkart.com", "smart phone", 2).unwrap();
/// assert_eq!(url.as_str(), "https://www.flipkart.com/search?q=smart+phone&page=2");
/// ```
pub fn search_url(base_url: &str, term: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    let path = format!("{}/search", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("q", term.trim())
        .append_pair("page", &page.to_string());
    Ok(url)
}
