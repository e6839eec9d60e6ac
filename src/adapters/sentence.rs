//! Rule-based sentence splitting
//!
//! A lightweight [`SentenceSplitter`] built on terminator punctuation, used
//! when no language-model-backed splitter is injected. Splits after runs of
//! `.`, `!`, `?` or `…` followed by whitespace or end of input, except when
//! the period closes a short abbreviation or an initial ("ул.", "И.").

use anyhow::Result;
use regex::Regex;

use crate::services::SentenceSplitter;

/// Rule-based sentence splitter
pub struct RuleSentenceSplitter {
    boundary: Regex,
}

impl RuleSentenceSplitter {
    /// Create a splitter with the default boundary rules
    pub fn new() -> Result<Self> {
        Ok(Self {
            boundary: Regex::new(r"[.!?…]+(?:\s+|$)")?,
        })
    }

    /// Whether the token preceding a period looks like an abbreviation or
    /// an initial rather than a sentence end
    fn ends_in_abbreviation(prefix: &str) -> bool {
        match prefix.split_whitespace().last() {
            Some(token) => token.chars().filter(|c| c.is_alphabetic()).count() <= 2,
            None => false,
        }
    }
}

impl SentenceSplitter for RuleSentenceSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in self.boundary.find_iter(text) {
            let terminator = m.as_str().trim_end();
            if terminator == "." && Self::ends_in_abbreviation(&text[start..m.start()]) {
                continue;
            }
            let sentence = text[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = m.end();
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        Ok(sentences)
    }
}

impl Default for RuleSentenceSplitter {
    fn default() -> Self {
        Self::new().expect("Failed to create default RuleSentenceSplitter")
    }
}
