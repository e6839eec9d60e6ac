//! Chunk data model

use serde::{Deserialize, Serialize};

/// Separator inserted between chunks when the analyzed text is reassembled.
///
/// Every chunk is followed by this separator, so a chunk's `start` offset is
/// the cumulative length of all previously reassembled chunks plus their
/// separators. Span offsets returned by the pipeline include this math.
pub const CHUNK_SEPARATOR: &str = "\n";

/// A length-bounded contiguous piece of text produced by the chunker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Start byte offset of this chunk in the reassembled text
    pub start: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }
}
