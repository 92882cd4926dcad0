// ============================================================
// Layer 4 - Stratified Train/Holdout Splitter
// ============================================================
// Splits labelled rows into a training partition and a holdout
// partition so both keep the class balance of the full dataset.
//
// Per class:
//   1. shuffle that class's rows with a seeded RNG
//   2. take round(n * test_fraction) rows for holdout,
//      clamped to [1, n - 1]
//
// The clamp is what guarantees every class appears in both
// partitions; it requires at least two rows per class.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom on a
// StdRng seeded from the configured seed, so the same seed
// always gives the same split.
//
// Reference: rand crate documentation

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::error::{PipelineError, PipelineResult};

/// Stratified split of `samples` into (train, holdout).
///
/// # Arguments
/// * `samples`       - All labelled samples (consumed)
/// * `label_of`      - Extracts the class label of a sample
/// * `test_fraction` - Holdout share per class, e.g. 0.25
/// * `seed`          - RNG seed for the per-class shuffle
pub fn stratified_split<T, F>(
    samples: Vec<T>,
    label_of: F,
    test_fraction: f64,
    seed: u64,
) -> PipelineResult<(Vec<T>, Vec<T>)>
where
    F: Fn(&T) -> u8,
{
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Configuration(format!(
            "test fraction must lie strictly between 0 and 1, got {test_fraction}"
        )));
    }

    let total = samples.len();
    let mut by_class: BTreeMap<u8, Vec<T>> = BTreeMap::new();
    for sample in samples {
        by_class.entry(label_of(&sample)).or_default().push(sample);
    }

    if by_class.len() < 2 {
        return Err(PipelineError::MalformedDataset(format!(
            "stratified split needs both classes, found {}",
            by_class.len()
        )));
    }
    if let Some((label, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(PipelineError::MalformedDataset(format!(
            "class {label} has {} row(s); stratification needs at least 2",
            rows.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(total);
    let mut holdout = Vec::new();

    // BTreeMap gives a fixed class order, so the RNG stream is reproducible
    for (label, mut rows) in by_class {
        rows.shuffle(&mut rng);
        let n = rows.len();
        let n_holdout = ((n as f64) * test_fraction).round() as usize;
        let n_holdout = n_holdout.clamp(1, n - 1);

        let class_holdout = rows.split_off(n - n_holdout);
        tracing::debug!(
            "Class {}: {} training, {} holdout",
            label,
            rows.len(),
            class_holdout.len()
        );
        train.extend(rows);
        holdout.extend(class_holdout);
    }

    tracing::debug!(
        "Dataset split: {} training, {} holdout ({}% / {}%)",
        train.len(),
        holdout.len(),
        (train.len() * 100) / total.max(1),
        (holdout.len() * 100) / total.max(1),
    );

    Ok((train, holdout))
}
