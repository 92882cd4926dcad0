// ============================================================
// Layer 4 - Sentiment Scorer
// ============================================================
// Lexicon lookup over owner complaints. The word lists are
// fixed configuration, never learned from data, so the same
// text scores identically at training and serving time.
//
// Normalisation per whitespace token:
//   1. strip trailing . , ! ?
//   2. lower-case
// Each distinct normalised word counts once.
//
// The lexicon is saved in the artifact manifest, so serving
// always scores with the word lists the model was trained on.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::vehicle::SentimentScores;

const TRAILING_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// Disjoint positive and negative word sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSentimentLexicon")]
pub struct SentimentLexicon {
    positive: BTreeSet<String>,
    negative: BTreeSet<String>,
}

#[derive(Deserialize)]
struct RawSentimentLexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl TryFrom<RawSentimentLexicon> for SentimentLexicon {
    type Error = PipelineError;

    fn try_from(raw: RawSentimentLexicon) -> PipelineResult<Self> {
        SentimentLexicon::new(raw.positive, raw.negative)
    }
}

impl SentimentLexicon {
    /// Build a lexicon; a word may not be both positive and negative.
    pub fn new<P, N>(positive: P, negative: N) -> PipelineResult<Self>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let positive: BTreeSet<String> =
            positive.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        let negative: BTreeSet<String> =
            negative.into_iter().map(|w| w.as_ref().to_lowercase()).collect();

        if let Some(word) = positive.intersection(&negative).next() {
            return Err(PipelineError::Configuration(format!(
                "sentiment word '{word}' is listed as both positive and negative"
            )));
        }
        Ok(Self { positive, negative })
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self {
            positive: ["reliable", "smooth", "satisfied", "comfortable", "quiet", "refined", "responsive"]
                .into_iter()
                .map(String::from)
                .collect(),
            negative: [
                "frustrating", "disappointed", "unsafe", "annoying", "expensive", "noisy",
                "rough", "lag", "stall", "failure",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentScorer {
    lexicon: SentimentLexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &SentimentLexicon {
        &self.lexicon
    }

    pub fn score(&self, text: &str) -> SentimentScores {
        let words: HashSet<String> = text
            .split_whitespace()
            .map(|token| token.trim_end_matches(TRAILING_PUNCTUATION).to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        let positive = words.iter().filter(|w| self.lexicon.positive.contains(*w)).count() as i64;
        let negative = words.iter().filter(|w| self.lexicon.negative.contains(*w)).count() as i64;

        SentimentScores { positive, negative, net: positive - negative }
    }
}
