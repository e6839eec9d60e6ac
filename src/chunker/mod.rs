//! Length-bounded text chunking
//!
//! Splits text into analyzer-sized pieces while keeping them
//! reconstructible. Split points are chosen in priority order: line
//! boundaries first, then sentence boundaries (an external capability),
//! then word boundaries, and as a last resort a hard character split that
//! guarantees forward progress even under a non-linear length function.
//!
//! Chunks rejoined with [`CHUNK_SEPARATOR`] reproduce content equivalent to
//! the input; with a non-zero overlap budget, trailing sentences of a
//! closed chunk may be repeated as a prefix of the next one, trading exact
//! reconstruction for analyzer context.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::errors::VeilError;
use crate::domain::{Chunk, CHUNK_SEPARATOR};
use crate::services::SentenceSplitter;

/// Chunking budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum measured length of one chunk
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Budget for retrying trailing sentences as the next chunk's prefix.
    /// Zero disables overlap and keeps reassembly lossless.
    #[serde(default)]
    pub overlap_size: usize,
}

fn default_max_chunk_size() -> usize {
    768
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            overlap_size: 0,
        }
    }
}

impl ChunkerConfig {
    /// Validate the budgets
    pub fn validate(&self) -> Result<(), VeilError> {
        if self.max_chunk_size == 0 {
            return Err(VeilError::Chunking(
                "max_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(VeilError::Chunking(format!(
                "overlap_size ({}) must be smaller than max_chunk_size ({})",
                self.overlap_size, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits text into length-bounded, order-preserving chunks
pub struct Chunker<'a> {
    config: ChunkerConfig,
    measure: &'a dyn Fn(&str) -> usize,
    splitter: &'a dyn SentenceSplitter,
}

impl<'a> Chunker<'a> {
    /// Create a chunker over a caller-supplied length function (a raw
    /// character count, or a token-aware measurement)
    pub fn new(
        config: ChunkerConfig,
        measure: &'a dyn Fn(&str) -> usize,
        splitter: &'a dyn SentenceSplitter,
    ) -> Result<Self, VeilError> {
        config.validate()?;
        Ok(Self {
            config,
            measure,
            splitter,
        })
    }

    /// Split `text` into chunks.
    ///
    /// No chunk's measured length exceeds `max_chunk_size`, except an
    /// atomically unsplittable single token, which is emitted alone even
    /// when oversized.
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        // units must individually fit the post-overlap budget so that an
        // overlap prefix plus one unit can never overflow a chunk
        let unit_budget = self.config.max_chunk_size - self.config.overlap_size;
        let units = self.split_units(text, unit_budget)?;
        let assembled = self.accumulate(units);

        let mut chunks = Vec::with_capacity(assembled.len());
        let mut offset = 0;
        for text in assembled {
            let len = text.len();
            chunks.push(Chunk::new(text, offset));
            offset += len + CHUNK_SEPARATOR.len();
        }
        Ok(chunks)
    }

    /// Reassemble chunks into the text the pipeline's offsets refer to:
    /// every chunk followed by the separator
    pub fn reassemble(chunks: &[Chunk]) -> String {
        let mut out = String::new();
        for chunk in chunks {
            out.push_str(&chunk.text);
            out.push_str(CHUNK_SEPARATOR);
        }
        out
    }

    /// Break the text into units no longer than `budget`, preferring line
    /// boundaries, then sentences, then words, then hard splits
    fn split_units(&self, text: &str, budget: usize) -> Result<Vec<String>> {
        let mut units = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let line = line.trim_end();
            if (self.measure)(line) <= budget {
                units.push(line.to_string());
                continue;
            }
            for sentence in self.splitter.split(line)? {
                if (self.measure)(&sentence) <= budget {
                    units.push(sentence);
                } else {
                    units.extend(self.split_long_sentence(&sentence, budget));
                }
            }
        }
        Ok(units)
    }

    /// Word-boundary split of an oversized sentence; oversized single words
    /// are hard-split
    fn split_long_sentence(&self, sentence: &str, budget: usize) -> Vec<String> {
        let mut result = Vec::new();
        let mut current = String::new();

        for word in sentence.split_whitespace() {
            let pieces = if (self.measure)(word) > budget {
                self.split_long_word(word, budget)
            } else {
                vec![word.to_string()]
            };

            for piece in pieces {
                let candidate = if current.is_empty() {
                    piece.clone()
                } else {
                    format!("{current} {piece}")
                };
                if (self.measure)(&candidate) <= budget {
                    current = candidate;
                } else {
                    if !current.is_empty() {
                        result.push(std::mem::take(&mut current));
                    }
                    current = piece;
                }
            }
        }
        if !current.is_empty() {
            result.push(current);
        }
        result
    }

    /// Hard-split a single word into the largest substrings the length
    /// function accepts. Always advances at least one character per piece,
    /// so progress is guaranteed even when the length function is
    /// non-linear.
    fn split_long_word(&self, word: &str, budget: usize) -> Vec<String> {
        let boundaries: Vec<usize> = word
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(word.len()))
            .collect();

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < boundaries.len() - 1 {
            let mut end = start + 1;
            while end + 1 < boundaries.len()
                && (self.measure)(&word[boundaries[start]..boundaries[end + 1]]) <= budget
            {
                end += 1;
            }
            pieces.push(word[boundaries[start]..boundaries[end]].to_string());
            start = end;
        }
        pieces
    }

    /// Accumulate units into chunks, retrying trailing units as the next
    /// chunk's prefix when an overlap budget is configured
    fn accumulate(&self, units: Vec<String>) -> Vec<String> {
        let max = self.config.max_chunk_size;
        let overlap = self.config.overlap_size;

        let mut chunks: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;

        for unit in units {
            let unit_len = (self.measure)(&unit);

            if current_len + unit_len <= max {
                current.push(unit);
                current_len += unit_len;
                continue;
            }
            if current.is_empty() {
                // unsplittable oversized unit, emitted alone
                chunks.push(unit);
                continue;
            }

            chunks.push(current.join(CHUNK_SEPARATOR));

            // gather trailing units that fit the overlap budget
            let mut prefix: Vec<String> = Vec::new();
            let mut prefix_len = 0usize;
            for prev in current.iter().rev() {
                let prev_len = (self.measure)(prev);
                if prefix_len + prev_len <= overlap {
                    prefix.insert(0, prev.clone());
                    prefix_len += prev_len;
                } else {
                    break;
                }
            }

            if !prefix.is_empty() && prefix_len + unit_len <= max {
                current = prefix;
                current.push(unit);
                current_len = prefix_len + unit_len;
            } else {
                current.clear();
                current_len = 0;
                chunks.push(unit);
            }
        }

        if !current.is_empty() {
            chunks.push(current.join(CHUNK_SEPARATOR));
        }
        chunks
    }
}
