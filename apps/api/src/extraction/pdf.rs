use std::panic;

use anyhow::{anyhow, Result};

/// Extracts the text layer of an in-memory PDF, pages in order.
///
/// `pdf-extract` panics on some malformed font and stream tables; a panic is
/// reported as an ordinary error so one bad upload cannot take a worker down.
pub fn extract_pdf_text(data: &[u8]) -> Result<String> {
    let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
        .map_err(|_| anyhow!("PDF parser aborted on malformed input"))??;

    Ok(normalize_page_breaks(&text))
}

/// Form feeds become newlines and runs of blank lines collapse to one.
fn normalize_page_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.replace('\u{c}', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}
