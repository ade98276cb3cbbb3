//! Token-budgeted chunking for long documents.
//!
//! Splits joined document text into ordered chunks that each fit a model's
//! context budget, measured with the model's own tokenizer.

mod packer;
mod tokenizer;

pub use packer::{split_into_chunks, ChunkPacker};
pub use tokenizer::{
    count_tokens, tokenizer_for_model, TiktokenTokenizer, Tokenizer, WordEstimateTokenizer,
};
