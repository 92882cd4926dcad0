// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The seams between the prediction core and its collaborators.
//
// Implementations:
//   - CsvDatasetLoader     → DatasetSource
//   - ReliabilityPredictor → ReliabilityEstimator
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::error::PipelineResult;
use crate::domain::prediction::{Comparison, PredictionResult};
use crate::domain::vehicle::VehicleRecord;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Anything that can supply the ordered rows of the reliability dataset.
pub trait DatasetSource {
    /// Load every row, validated. Fails if the dataset is absent
    /// or lacks any expected column.
    fn load_records(&self) -> PipelineResult<Vec<VehicleRecord>>;
}

// ─── ReliabilityEstimator ─────────────────────────────────────────────────────
/// Anything that turns a raw record into a prediction.
pub trait ReliabilityEstimator {
    fn predict(&self, record: &VehicleRecord) -> PipelineResult<PredictionResult>;

    /// Two independent single-record predictions; no cross-record normalisation.
    fn compare(&self, car_a: &VehicleRecord, car_b: &VehicleRecord) -> PipelineResult<Comparison> {
        Ok(Comparison {
            car_a: self.predict(car_a)?,
            car_b: self.predict(car_b)?,
        })
    }
}
