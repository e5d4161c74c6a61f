use std::io::{Cursor, Read};

use anyhow::{bail, Result};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the inflated size of `word/document.xml`.
pub const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;

/// Extracts paragraph text from a DOCX archive in document order.
///
/// Runs (`w:t`) inside a paragraph (`w:p`) are concatenated; `w:tab` becomes a tab and
/// `w:br`/`w:cr` a newline. Paragraphs with no visible text are dropped.
pub fn extract_docx_text(data: &[u8]) -> Result<String> {
    extract_docx_text_with_limit(data, MAX_DOCUMENT_XML_BYTES)
}

fn extract_docx_text_with_limit(data: &[u8], limit: u64) -> Result<String> {
    let cursor = Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let document_file = archive.by_name(DOCUMENT_PART)?;
    if document_file.size() > limit {
        bail!(
            "{DOCUMENT_PART} inflates to {} bytes (limit {limit})",
            document_file.size()
        );
    }

    // The declared size can lie; never read more than the limit.
    let mut xml = String::new();
    document_file.take(limit + 1).read_to_string(&mut xml)?;
    if xml.len() as u64 > limit {
        bail!("{DOCUMENT_PART} exceeds {limit} bytes once inflated");
    }

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Paragraphs nest when a run carries a text box (`w:txbxContent`), so each open
/// `w:p` gets its own buffer. A paragraph is emitted when it closes.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(e) => {
                if let Some(current) = open.last_mut() {
                    match e.name().as_ref() {
                        b"w:tab" => current.push('\t'),
                        b"w:br" | b"w:cr" => current.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(finished) = open.pop() {
                        let text = finished.trim();
                        if !text.is_empty() {
                            paragraphs.push(text.to_string());
                        }
                    }
                }
                b"w:t" => in_text_run = false,
                _ => {}
            },
            Event::Text(e) if in_text_run => {
                if let Some(current) = open.last_mut() {
                    current.push_str(&e.xml_content()?);
                }
            }
            Event::GeneralRef(e) if in_text_run => {
                if let Some(current) = open.last_mut() {
                    if let Some(ch) = e.resolve_char_ref()? {
                        current.push(ch);
                    } else {
                        let name = e.decode()?;
                        if let Some(value) = resolve_predefined_entity(&name) {
                            current.push_str(value);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(paragraphs)
}
