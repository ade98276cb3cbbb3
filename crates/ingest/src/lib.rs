//! Document text extraction and token-budgeted chunking.

pub mod document;

pub use document::chunker::{count_tokens, split_into_chunks, ChunkPacker, Tokenizer};
pub use document::{extract_document, DocumentFormat, ExtractedDocument, ExtractionError, PageContent};
