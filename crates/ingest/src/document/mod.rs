pub mod chunker;
mod docx;
mod pdf;
mod txt;

use thiserror::Error;

pub use docx::extract_docx;
pub use pdf::extract_pdf;
pub use txt::extract_txt;

/// Separator placed between PDF pages in the joined text.
const PAGE_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Formats the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let lower = filename.to_lowercase();
        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => return Err(ExtractionError::UnsupportedType(String::new())),
        };
        match ext {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::PlainText),
            other => Err(ExtractionError::UnsupportedType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "txt",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

/// A page of extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// 1-based page number (for PDFs). For TXT/DOCX, always 1.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
}

/// Result of extracting text from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    pub format: DocumentFormat,
    /// Extracted pages with text.
    pub pages: Vec<PageContent>,
}

impl ExtractedDocument {
    /// The whole document as one string. PDF pages keep `[Page N]` markers so
    /// risks found downstream can still be traced to a page.
    pub fn joined_text(&self) -> String {
        match self.format {
            DocumentFormat::Pdf => self
                .pages
                .iter()
                .map(|p| format!("[Page {}]\n{}", p.page_number, p.text))
                .collect::<Vec<_>>()
                .join(PAGE_SEPARATOR),
            DocumentFormat::PlainText | DocumentFormat::Docx => self
                .pages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// Character count of `joined_text()`.
    pub fn char_count(&self) -> usize {
        self.joined_text().chars().count()
    }
}

/// Extract text from file bytes based on the filename extension.
pub fn extract_document(
    bytes: &[u8],
    filename: &str,
    pdf_max_pages: usize,
) -> Result<ExtractedDocument, ExtractionError> {
    let format = DocumentFormat::from_filename(filename)?;

    let pages = match format {
        DocumentFormat::Pdf => extract_pdf(bytes, pdf_max_pages)?,
        DocumentFormat::Docx => single_page(extract_docx(bytes)?),
        DocumentFormat::PlainText => single_page(extract_txt(bytes)),
    };

    tracing::debug!(
        "Extracted '{}' (type={}): {} pages",
        filename,
        format.as_str(),
        pages.len()
    );

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        format,
        pages,
    })
}

fn single_page(text: String) -> Vec<PageContent> {
    vec![PageContent { page_number: 1, text }]
}
