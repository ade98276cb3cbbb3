use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract plain text from a `.docx` (Office Open XML) document.
///
/// Each non-blank `w:p` paragraph becomes one line. Runs (`w:t`) inside a
/// paragraph are concatenated; `w:tab` and `w:br` become a tab and a newline.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a valid DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(format!("failed to read {DOCUMENT_PART}: {e}")))?;

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n").trim().to_string())
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Text boxes nest `w:p` inside a run of an outer paragraph; their text
    // stays part of the outer one.
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if depth == 0 {
                        current.clear();
                    }
                    depth += 1;
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    depth = depth.saturating_sub(1);
                    if depth > 0 {
                        if !current.is_empty() && !current.ends_with('\n') {
                            current.push('\n');
                        }
                    } else {
                        if !current.trim().is_empty() {
                            paragraphs.push(std::mem::take(&mut current));
                        }
                        current.clear();
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(format!("bad text node: {e}")))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Docx(format!(
                    "XML error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}
