// ============================================================
// Layer 4 - Domain Feature Engineer
// ============================================================
// Derives the engineered columns from a raw VehicleRecord:
//
//   car_age                  = reference_year - year
//   total_cost_last_year     = maintenance + fuel
//   estimated_next_year_cost = total * (1.05 + 0.02 * issue)
//   ownership_cost_score     = total / max(avg_trip_length, 1)
//
// plus the three sentiment counts of the complaint text.
//
// `issue` is the label when present and 0 otherwise. At serving
// time the label is always absent, so the next-year estimate is
// computed slightly differently than during training. Models
// trained with the default FeatureConfig never see that column.
//
// prepare_records is the ONE preparation path shared by the
// training protocol and the inference engine.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            rayon documentation (par_iter preserves order)

use rayon::prelude::*;

use crate::data::sentiment::SentimentScorer;
use crate::domain::vehicle::{EngineeredRecord, VehicleRecord};

pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

const NEXT_YEAR_GROWTH: f64 = 1.05;
const ISSUE_SURCHARGE: f64 = 0.02;
const MIN_TRIP_LENGTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureEngineer {
    reference_year: i32,
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_YEAR)
    }
}

impl FeatureEngineer {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Derive the engineered view of one record. Sentiment is
    /// left at zero; see `prepare_record` for the full path.
    pub fn engineer(&self, record: &VehicleRecord) -> EngineeredRecord {
        let total = record.total_cost_last_year();
        let issue = record.has_mechanical_issue.unwrap_or(0) as f64;

        EngineeredRecord {
            record: record.clone(),
            car_age: self.reference_year - record.year,
            total_cost_last_year: total,
            estimated_next_year_cost: total * (NEXT_YEAR_GROWTH + ISSUE_SURCHARGE * issue),
            ownership_cost_score: total / record.avg_trip_length_miles.max(MIN_TRIP_LENGTH),
            sentiment: Default::default(),
        }
    }
}

/// Engineer one record and score its complaint.
pub fn prepare_record(
    record: &VehicleRecord,
    engineer: &FeatureEngineer,
    scorer: &SentimentScorer,
) -> EngineeredRecord {
    let mut engineered = engineer.engineer(record);
    engineered.sentiment = scorer.score(&record.complaint_text);
    engineered
}

/// Prepare many records in parallel. Output order matches input order.
pub fn prepare_records(
    records: &[VehicleRecord],
    engineer: &FeatureEngineer,
    scorer: &SentimentScorer,
) -> Vec<EngineeredRecord> {
    records
        .par_iter()
        .map(|r| prepare_record(r, engineer, scorer))
        .collect()
}
