// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// This layer handles everything from the raw CSV dataset to
// tensor batches, plus the complaint analytics.
//
// The pipeline flows in this order:
//
//   dataset.csv
//       │
//       ▼
//   CsvDatasetLoader   → reads and validates VehicleRecords
//       │
//       ▼
//   prepare_records    → FeatureEngineer + SentimentScorer
//       │
//       ▼
//   stratified_split   → training / holdout partitions
//       │
//       ▼
//   FittedTransform    → fixed-width f32 feature vectors
//       │
//       ▼
//   RiskDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   RiskBatcher        → stacks samples into tensor batches
//
// Inference reuses prepare_records and FittedTransform so both
// paths see identical features.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads the CSV dataset
pub mod loader;

/// Shared tokeniser and stop words
pub mod text;

/// Lexicon sentiment counts
pub mod sentiment;

/// Derived domain columns and the shared preparation step
pub mod features;

/// Fit-once column transform (scaling, one-of-k, TF-IDF)
pub mod transform;

/// Stratified, seeded train/holdout split
pub mod splitter;

/// Implements Burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Frequent phrases and per-class terms in complaints
pub mod complaints;

#[cfg(test)]
pub mod fixtures;
