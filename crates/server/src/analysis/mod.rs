//! Document analysis pipeline: extraction, length gate, optional chunking,
//! and per-chunk risk extraction.

mod aggregator;
mod error;
mod orchestrator;

pub use error::AnalyzeError;
pub use orchestrator::{AnalyzeRequest, Orchestrator};
