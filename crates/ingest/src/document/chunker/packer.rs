//! Greedy token-budget packing of paragraphs, with a sentence-level fallback
//! for paragraphs that do not fit on their own.

use std::sync::Arc;

use super::tokenizer::{tokenizer_for_model, Tokenizer};

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_BOUNDARY: &str = ". ";

pub struct ChunkPacker {
    tokenizer: Arc<dyn Tokenizer>,
    max_tokens: usize,
}

impl ChunkPacker {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, max_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_tokens,
        }
    }

    /// The budget actually enforced (the tokenizer may shrink `max_tokens`).
    pub fn budget(&self) -> usize {
        self.tokenizer.budget(self.max_tokens)
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Split `text` into ordered, non-empty chunks of at most `budget()`
    /// tokens each.
    ///
    /// Paragraphs (separated by blank lines) are accumulated greedily. A
    /// paragraph that alone exceeds the budget is split at `". "` and its
    /// sentences packed the same way. A single sentence over budget is
    /// emitted as its own chunk: content is never dropped, so that chunk is
    /// the one case where the budget does not hold.
    pub fn pack(&self, text: &str) -> Vec<String> {
        let budget = self.budget();
        let text = text.replace("\r\n", "\n");
        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in text
            .split(PARAGRAPH_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            let candidate = joined(&current, PARAGRAPH_SEPARATOR, paragraph);
            if self.fits(&candidate, budget) {
                current = candidate;
                continue;
            }

            flush(&mut chunks, &mut current);

            if self.fits(paragraph, budget) {
                current = paragraph.to_string();
            } else {
                self.pack_sentences(paragraph, budget, &mut chunks);
            }
        }

        flush(&mut chunks, &mut current);
        chunks
    }

    fn pack_sentences(&self, paragraph: &str, budget: usize, chunks: &mut Vec<String>) {
        let mut current = String::new();

        // The period stays with its sentence; sentences re-join with one space.
        for sentence in paragraph
            .split_inclusive(SENTENCE_BOUNDARY)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let candidate = joined(&current, " ", sentence);
            if self.fits(&candidate, budget) {
                current = candidate;
                continue;
            }

            flush(chunks, &mut current);

            if !self.fits(sentence, budget) {
                tracing::debug!(
                    "Sentence of {} tokens exceeds chunk budget of {}, emitting it whole",
                    self.tokenizer.count_tokens(sentence),
                    budget
                );
            }
            current = sentence.to_string();
        }

        flush(chunks, &mut current);
    }

    fn fits(&self, text: &str, budget: usize) -> bool {
        self.tokenizer.count_tokens(text) <= budget
    }
}

fn joined(current: &str, separator: &str, next: &str) -> String {
    if current.is_empty() {
        next.to_string()
    } else {
        format!("{current}{separator}{next}")
    }
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        chunks.push(text.to_string());
    }
    current.clear();
}

/// Split `text` into chunks of at most `max_tokens` tokens as counted for
/// `model_id`.
pub fn split_into_chunks(text: &str, max_tokens: usize, model_id: &str) -> Vec<String> {
    ChunkPacker::new(tokenizer_for_model(model_id), max_tokens).pack(text)
}
