// ============================================================
// Layer 5 - Holdout Evaluation
// ============================================================
// Scores predicted probabilities against true labels.
//
//   roc_auc   Mann-Whitney form: rank all scores (ties get the
//             average rank), then
//             (Σ ranks of positives - P(P+1)/2) / (P * N)
//   precision / recall / F1 for class 1 ("high risk")
//   accuracy  fraction of correct 0/1 decisions
//
// Decisions use a fixed 0.5 threshold. Any metric whose
// denominator is zero is reported as 0.
//
// Reference: Hanley & McNeil (1982), the meaning and use of
//            the area under a ROC curve

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub roc_auc: f64,
    pub precision_high_risk: f64,
    pub recall_high_risk: f64,
    pub f1_high_risk: f64,
    pub accuracy: f64,
}

impl EvaluationMetrics {
    /// `labels[i]` is 0 or 1; `probabilities[i]` its predicted P(1).
    pub fn compute(labels: &[u8], probabilities: &[f64]) -> Self {
        debug_assert_eq!(labels.len(), probabilities.len());

        let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
        for (&label, &p) in labels.iter().zip(probabilities) {
            match (label == 1, p >= DECISION_THRESHOLD) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (false, false) => tn += 1,
                (true, false) => fn_ += 1,
            }
        }

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            roc_auc: roc_auc(labels, probabilities),
            precision_high_risk: precision,
            recall_high_risk: recall,
            f1_high_risk: f1,
            accuracy: ratio(tp + tn, labels.len()),
        }
    }

    /// Flat `metric → value` view written to the metrics report.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        [
            ("roc_auc", self.roc_auc),
            ("precision_high_risk", self.precision_high_risk),
            ("recall_high_risk", self.recall_high_risk),
            ("f1_high_risk", self.f1_high_risk),
            ("accuracy", self.accuracy),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Area under the ROC curve; 0 when either class is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> f64 {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based ranks, ties share the mean of the ranks they span
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let mean_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = mean_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(l, _)| **l == 1)
        .map(|(_, r)| r)
        .sum();
    let p = positives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_and_inverted_ranking() {
        let labels = [0, 0, 1, 1];
        assert_eq!(roc_auc(&labels, &[0.1, 0.2, 0.8, 0.9]), 1.0);
        assert_eq!(roc_auc(&labels, &[0.9, 0.8, 0.2, 0.1]), 0.0);
    }

    #[test]
    fn test_ties_count_half() {
        // every pair tied → 0.5
        assert_eq!(roc_auc(&[0, 1, 0, 1], &[0.5; 4]), 0.5);
        // one positive above one negative, one tied pair: (1 + 0.5 + 1 + 1) / 4
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.6, 0.6, 0.9]), 0.875);
    }

    #[test]
    fn test_single_class_auc_is_zero() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.2, 0.4, 0.9]), 0.0);
    }

    #[test]
    fn test_confusion_metrics() {
        // tp = 2, fp = 1, fn = 1, tn = 2
        let labels = [1, 1, 1, 0, 0, 0];
        let probs = [0.9, 0.7, 0.3, 0.6, 0.2, 0.1];
        let m = EvaluationMetrics::compute(&labels, &probs);
        assert!((m.precision_high_risk - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall_high_risk - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1_high_risk - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.accuracy - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let m = EvaluationMetrics::compute(&[1], &[0.5]);
        assert_eq!(m.recall_high_risk, 1.0);
    }

    #[test]
    fn test_undefined_metrics_are_zero() {
        // nothing predicted positive, no positives present
        let m = EvaluationMetrics::compute(&[0, 0], &[0.1, 0.2]);
        assert_eq!(m.precision_high_risk, 0.0);
        assert_eq!(m.recall_high_risk, 0.0);
        assert_eq!(m.f1_high_risk, 0.0);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.roc_auc, 0.0);
    }

    #[test]
    fn test_metric_keys() {
        let keys: Vec<String> = EvaluationMetrics::compute(&[0, 1], &[0.2, 0.8])
            .to_map()
            .into_keys()
            .collect();
        assert_eq!(
            keys,
            ["accuracy", "f1_high_risk", "precision_high_risk", "recall_high_risk", "roc_auc"]
        );
    }
}
