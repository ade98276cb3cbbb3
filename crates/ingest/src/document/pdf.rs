use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractionError, PageContent};

static INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Collapse runs of spaces/tabs to one space and runs of three or more
/// newlines to a single blank line.
fn normalize_page_text(text: &str) -> String {
    let text = INLINE_SPACE.replace_all(text, " ");
    EXCESS_NEWLINES.replace_all(&text, "\n\n").trim().to_string()
}

/// Extract per-page text from a PDF. Only the first `max_pages` pages are
/// read; pages without text are skipped but keep their numbering.
pub fn extract_pdf(bytes: &[u8], max_pages: usize) -> Result<Vec<PageContent>, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    // pdf-extract returns all text as one string with form feeds between pages.
    let total = text.split('\x0C').count();
    let pages: Vec<PageContent> = text
        .split('\x0C')
        .take(max_pages)
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            text: normalize_page_text(page_text),
        })
        .filter(|p| !p.text.is_empty())
        .collect();

    if total > max_pages {
        tracing::warn!("PDF has {} pages, only the first {} were read", total, max_pages);
    }
    if pages.is_empty() {
        // Scanned/image-only PDFs land here; the length gate downstream reports it.
        tracing::warn!("PDF contains no extractable text layer");
    }

    Ok(pages)
}
