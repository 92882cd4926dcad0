// ============================================================
// Layer 4 - Complaint Pattern Miner
// ============================================================
// Two read-only analyses over a labelled corpus of complaints:
//
//   frequent_patterns     2-3 word phrases seen in at least two
//                         complaints, weighted by how severe the
//                         corpus is overall
//   discriminative_terms  the most frequent words per reliability
//                         class ("High Risk" / "Low Risk")
//
// Both drop English stop words before forming phrases, and both
// degrade to an empty result when there is nothing to mine.
//
// Reference: Rust Book §8 (HashMap), §13 (Iterators)

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::text::{content_tokens, ngrams};
use crate::domain::ownership::round_cents;
use crate::domain::vehicle::VehicleRecord;

pub const DEFAULT_TOP_PATTERNS: usize = 8;
pub const DEFAULT_TOP_TERMS: usize = 5;

/// A phrase must occur in this many complaints to count as a pattern.
const MIN_DOCUMENT_FREQUENCY: usize = 2;
/// Floor on the severity spread so a uniform corpus does not explode the weight.
const MIN_SEVERITY_SPREAD: f64 = 0.5;
const MAX_TERM_VOCABULARY: usize = 500;

pub const HIGH_RISK_LABEL: &str = "High Risk";
pub const LOW_RISK_LABEL: &str = "Low Risk";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePattern {
    pub pattern: String,
    pub weighted_score: f64,
}

/// Top `top_n` recurring complaint phrases, heaviest first.
pub fn frequent_patterns(records: &[VehicleRecord], top_n: usize) -> Vec<FailurePattern> {
    if records.is_empty() || top_n == 0 {
        return Vec::new();
    }

    // phrase → (total count, documents containing it)
    let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for record in records {
        let phrases = ngrams(&content_tokens(&record.complaint_text), 2, 3);
        let mut seen = HashSet::new();
        for phrase in phrases {
            let first_in_doc = seen.insert(phrase.clone());
            let entry = stats.entry(phrase).or_insert((0, 0));
            entry.0 += 1;
            if first_in_doc {
                entry.1 += 1;
            }
        }
    }

    let n = records.len() as f64;
    let mean = records.iter().map(|r| r.severity_score).sum::<f64>() / n;
    let std = (records
        .iter()
        .map(|r| (r.severity_score - mean).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();
    let factor = mean / std.max(MIN_SEVERITY_SPREAD);

    // BTreeMap order is alphabetical; the stable sort keeps it for ties.
    let mut ranked: Vec<(String, usize)> = stats
        .into_iter()
        .filter(|(_, (_, df))| *df >= MIN_DOCUMENT_FREQUENCY)
        .map(|(phrase, (count, _))| (phrase, count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    if ranked.is_empty() {
        tracing::warn!("No complaint phrase occurs in {MIN_DOCUMENT_FREQUENCY}+ records");
    }

    ranked
        .into_iter()
        .take(top_n)
        .map(|(pattern, count)| FailurePattern {
            pattern,
            weighted_score: round_cents(count as f64 * factor),
        })
        .collect()
}

/// Most frequent complaint words per reliability class.
///
/// Records without a label are skipped.
pub fn discriminative_terms(
    records: &[VehicleRecord],
    top_n: usize,
) -> BTreeMap<String, Vec<String>> {
    let tokenised: Vec<(Vec<String>, u8)> = records
        .iter()
        .filter_map(|r| {
            r.has_mechanical_issue
                .map(|label| (content_tokens(&r.complaint_text), label))
        })
        .collect();
    if tokenised.len() < records.len() {
        tracing::warn!("Skipped {} unlabelled records", records.len() - tokenised.len());
    }
    if tokenised.is_empty() {
        return BTreeMap::new();
    }

    let vocabulary = term_vocabulary(&tokenised, MAX_TERM_VOCABULARY);

    let mut per_class: BTreeMap<u8, HashMap<&str, usize>> = BTreeMap::new();
    for (tokens, label) in &tokenised {
        let counts = per_class.entry(*label).or_default();
        for token in tokens {
            if vocabulary.contains(token.as_str()) {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }
    }

    per_class
        .into_iter()
        .map(|(label, counts)| {
            // Only terms this class actually uses are ranked, so a class
            // with a sparse vocabulary can return fewer than top_n terms.
            let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            let terms = ranked.into_iter().take(top_n).map(|(t, _)| t.to_string()).collect();
            let name = if label == 1 { HIGH_RISK_LABEL } else { LOW_RISK_LABEL };
            (name.to_string(), terms)
        })
        .collect()
}

// The `cap` most frequent terms across the whole corpus, ties alphabetical.
fn term_vocabulary(tokenised: &[(Vec<String>, u8)], cap: usize) -> HashSet<&str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (tokens, _) in tokenised {
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(cap).map(|(t, _)| t).collect()
}
