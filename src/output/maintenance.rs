//! The `--show` and `--clear` modes
//!
//! Both work against any [`ProductStore`] and take their console streams as
//! arguments, so `main` passes stdin/stdout and tests pass buffers.

use crate::output::stats::format_products;
use crate::storage::ProductStore;
use crate::Result;
use std::io::{self, BufRead, Write};

/// Writes the `limit` newest products to `out`
///
/// # Returns
///
/// The number of products listed
pub async fn show_products<W: Write>(
    store: &dyn ProductStore,
    limit: u32,
    out: &mut W,
) -> Result<usize> {
    let products = store.query(limit).await?;
    out.write_all(format_products(&products).as_bytes())?;
    out.flush()?;
    Ok(products.len())
}

/// Deletes every stored product, asking on `input` first unless `assume_yes`
///
/// An empty table is reported without asking. Anything but `y`/`yes` at the
/// prompt, including end of input, keeps the records.
///
/// # Returns
///
/// The number of records removed
pub async fn clear_products<R: BufRead, W: Write>(
    store: &dyn ProductStore,
    assume_yes: bool,
    input: &mut R,
    out: &mut W,
) -> Result<u64> {
    let existing = store.count().await?;
    if existing == 0 {
        writeln!(out, "0 records removed")?;
        return Ok(0);
    }

    if !assume_yes {
        let answer = prompt_line(
            input,
            out,
            &format!("Delete {} records? [y/N] ", existing),
        )?;
        if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
            writeln!(out, "Aborted, 0 records removed")?;
            return Ok(0);
        }
    }

    let removed = store.clear_all().await?;
    writeln!(out, "{} records removed", removed)?;
    Ok(removed)
}

/// Writes `message`, then reads one trimmed line from `input`
///
/// End of input reads as an empty answer.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<String> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
