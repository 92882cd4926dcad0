// ============================================================
// Layer 2 - Predict Use Case
// ============================================================
// Serves predictions from a trained pipeline:
//
//   Step 1: Validate the raw record          (Layer 3 - domain)
//   Step 2: Engineer features + sentiment    (Layer 4 - data)
//   Step 3: Transform + classify             (Layer 5 - ml)
//   Step 4: Band, cost projection, timeline  (Layer 3 - domain)
//
// Step 2 is the same prepare_records call training uses, with
// the reference year and sentiment lexicon read back from the
// artifact manifest.
// Any label on an incoming record is dropped so the derived
// columns are computed exactly as for an unseen vehicle.
//
// The artifact is loaded once, up front. After that the
// predictor is read-only, so batch requests run their per-row
// work in parallel.

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::data::{
    features::{prepare_records, FeatureEngineer},
    sentiment::SentimentScorer,
};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::ownership::{CostInputs, CostProjector};
use crate::domain::prediction::{PredictionResult, RiskBand};
use crate::domain::timeline::TimelineSynthesizer;
use crate::domain::traits::ReliabilityEstimator;
use crate::domain::vehicle::{EngineeredRecord, VehicleRecord};
use crate::infra::checkpoint::ArtifactStore;
use crate::ml::inferencer::Inferencer;

/// Parse a JSON mapping into a validated record.
///
/// Missing fields, unknown fields and wrong types are all
/// input-shape errors.
pub fn parse_record(value: serde_json::Value) -> PipelineResult<VehicleRecord> {
    let record: VehicleRecord = serde_json::from_value(value)
        .map_err(|e| PipelineError::InputShape(e.to_string()))?;
    record.validated()
}

pub struct ReliabilityPredictor {
    inferencer: Inferencer,
    engineer:   FeatureEngineer,
    scorer:     SentimentScorer,
    projector:  CostProjector,
    timeline:   TimelineSynthesizer,
}

impl ReliabilityPredictor {
    /// Load the trained pipeline from `artifact_dir`.
    pub fn load(artifact_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = artifact_dir.as_ref();
        let store = ArtifactStore::new(dir);
        let (inferencer, manifest) = Inferencer::from_checkpoint(&store)
            .with_context(|| format!("Cannot load the trained pipeline from '{}'", dir.display()))?;

        tracing::info!(
            "Predictor ready (trained by v{}, width {})",
            manifest.crate_version,
            manifest.feature_width
        );
        Ok(Self {
            engineer: FeatureEngineer::new(manifest.reference_year),
            scorer: SentimentScorer::new(manifest.sentiment_lexicon.clone()),
            inferencer,
            projector: CostProjector::default(),
            timeline: TimelineSynthesizer::default(),
        })
    }

    pub fn with_cost_projector(mut self, projector: CostProjector) -> Self {
        self.projector = projector;
        self
    }

    pub fn with_timeline(mut self, timeline: TimelineSynthesizer) -> Self {
        self.timeline = timeline;
        self
    }

    /// Predict many records. Results come back in input order.
    pub fn predict_batch(&self, records: &[VehicleRecord]) -> PipelineResult<Vec<PredictionResult>> {
        let records: Vec<VehicleRecord> = records
            .par_iter()
            .map(|r| {
                let mut r = r.clone();
                r.has_mechanical_issue = None;
                r.validated()
            })
            .collect::<PipelineResult<_>>()?;

        let rows = prepare_records(&records, &self.engineer, &self.scorer);
        let probabilities = self.inferencer.predict_proba(&rows)?;

        let projector = &self.projector;
        let timeline = &self.timeline;
        Ok(rows
            .par_iter()
            .zip(probabilities.par_iter())
            .map(|(row, &p)| assemble(row, p, projector, timeline))
            .collect())
    }

    /// Parse a JSON mapping and predict it.
    pub fn predict_json(&self, value: serde_json::Value) -> PipelineResult<PredictionResult> {
        self.predict(&parse_record(value)?)
    }
}

fn assemble(
    row: &EngineeredRecord,
    probability: f64,
    projector: &CostProjector,
    timeline: &TimelineSynthesizer,
) -> PredictionResult {
    let inputs = CostInputs {
        maintenance_action: &row.record.maintenance_action,
        maintenance_cost_last_year: row.record.maintenance_cost_last_year,
        total_cost_last_year: row.total_cost_last_year,
    };
    PredictionResult {
        probability,
        risk_band: RiskBand::from_probability(probability),
        cost_projection: projector.project(inputs, probability),
        maintenance_timeline: timeline.synthesize(probability),
    }
}

impl ReliabilityEstimator for ReliabilityPredictor {
    fn predict(&self, record: &VehicleRecord) -> PipelineResult<PredictionResult> {
        self.predict_batch(std::slice::from_ref(record))?
            .pop()
            .ok_or_else(|| PipelineError::Tensor("classifier returned no probability".to_string()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::data::fixtures;
    use crate::data::sentiment::SentimentLexicon;
    use crate::domain::ownership::CostAssumptions;
    use crate::domain::prediction::Timeframe;
    use crate::domain::timeline::TimelinePolicy;
    use std::path::PathBuf;

    fn trained(root: &Path) -> PathBuf {
        trained_with(root, None)
    }

    fn trained_with(root: &Path, lexicon: Option<SentimentLexicon>) -> PathBuf {
        let cfg = TrainConfig {
            data_path: root.join("cars.csv"),
            artifact_dir: root.join("artifacts"),
            reports_dir: root.join("reports"),
            epochs: 20,
            sentiment_lexicon: lexicon,
            ..TrainConfig::default()
        };
        fixtures::write_csv(&cfg.data_path, &fixtures::synthetic_records(160, 8));
        TrainUseCase::new(cfg.clone()).execute().unwrap();
        cfg.artifact_dir
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReliabilityPredictor::load(dir.path().join("nothing")).err().unwrap();
        assert!(format!("{err:#}").contains("Train the model before predicting"));
    }

    #[test]
    fn test_parse_record_is_strict() {
        let good = serde_json::to_value(fixtures::sample_record()).unwrap();
        assert!(parse_record(good.clone()).is_ok());

        let mut missing = good.clone();
        missing.as_object_mut().unwrap().remove("mileage");
        assert!(matches!(parse_record(missing), Err(PipelineError::InputShape(_))));

        let mut extra = good.clone();
        extra["turbo"] = serde_json::json!(true);
        assert!(matches!(parse_record(extra), Err(PipelineError::InputShape(_))));

        let mut wrong_type = good;
        wrong_type["year"] = serde_json::json!("twenty-eighteen");
        assert!(matches!(parse_record(wrong_type), Err(PipelineError::InputShape(_))));

        assert!(parse_record(serde_json::json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_predict_compare_and_batch() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = ReliabilityPredictor::load(trained(dir.path())).unwrap();
        assert_eq!(predictor.engineer.reference_year(), 2024);

        let records = fixtures::synthetic_records(12, 99);

        // Idempotent: identical input, bit-identical output
        let first = predictor.predict(&records[0]).unwrap();
        let again = predictor.predict(&records[0]).unwrap();
        assert_eq!(first, again);
        assert!((0.0..=1.0).contains(&first.probability));
        assert_eq!(first.risk_band, RiskBand::from_probability(first.probability));
        assert!(first.cost_projection.depreciation_estimate >= 500.0);

        // Batch keeps order and matches single predictions
        let batch = predictor.predict_batch(&records).unwrap();
        assert_eq!(batch.len(), records.len());
        for (record, result) in records.iter().zip(&batch) {
            let single = predictor.predict(record).unwrap();
            assert!((single.probability - result.probability).abs() < 1e-6);
        }

        // Compare is two independent predictions
        let cmp = predictor.compare(&records[1], &records[2]).unwrap();
        assert_eq!(cmp.car_a, predictor.predict(&records[1]).unwrap());
        assert_eq!(cmp.car_b, predictor.predict(&records[2]).unwrap());
    }

    #[test]
    fn test_label_on_input_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = ReliabilityPredictor::load(trained(dir.path())).unwrap();

        let mut with_label = fixtures::sample_record();
        with_label.has_mechanical_issue = Some(1);
        let mut without = with_label.clone();
        without.has_mechanical_issue = None;
        assert_eq!(predictor.predict(&with_label).unwrap(), predictor.predict(&without).unwrap());
    }

    #[test]
    fn test_timeline_follows_probability() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = ReliabilityPredictor::load(trained(dir.path())).unwrap();

        for record in fixtures::synthetic_records(20, 5) {
            let result = predictor.predict(&record).unwrap();
            let expected = if result.probability > 0.6 { 4 } else { 3 };
            assert_eq!(result.maintenance_timeline.len(), expected);
            if expected == 4 {
                assert_eq!(result.maintenance_timeline[0].timeframe, Timeframe::Days(30));
            }
        }
    }

    #[test]
    fn test_predict_json_clamps_severity() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = ReliabilityPredictor::load(trained(dir.path())).unwrap();

        let mut high = serde_json::to_value(fixtures::sample_record()).unwrap();
        high["severity_score"] = serde_json::json!(42.0);
        let mut capped = high.clone();
        capped["severity_score"] = serde_json::json!(10.0);
        assert_eq!(
            predictor.predict_json(high).unwrap(),
            predictor.predict_json(capped).unwrap()
        );
    }

    #[test]
    fn test_serving_uses_trained_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = SentimentLexicon::new(["battery"], ["engine"]).unwrap();
        let predictor =
            ReliabilityPredictor::load(trained_with(dir.path(), Some(lexicon.clone()))).unwrap();
        assert_eq!(predictor.scorer.lexicon(), &lexicon);

        let record = fixtures::sample_record();
        let row = &prepare_records(
            std::slice::from_ref(&record),
            &predictor.engineer,
            &predictor.scorer,
        )[0];
        assert_eq!(row.sentiment, SentimentScorer::new(lexicon).score(&record.complaint_text));
    }

    #[test]
    fn test_injected_cost_and_timeline() {
        let dir = tempfile::tempdir().unwrap();
        let assumptions = CostAssumptions {
            annual_mileage: 2600.0,
            efficiency_mpg: 26.0,
            fuel_price_per_gallon: 1.0,
            depreciation_rate: 0.0,
            depreciation_floor: 777.0,
            ..CostAssumptions::default()
        };
        let policy = TimelinePolicy {
            specialist_threshold: -1.0,
            specialist_within_days: 14,
            ..TimelinePolicy::default()
        };
        let predictor = ReliabilityPredictor::load(trained(dir.path()))
            .unwrap()
            .with_cost_projector(CostProjector::new(assumptions))
            .with_timeline(TimelineSynthesizer::new(policy));

        let result = predictor.predict(&fixtures::sample_record()).unwrap();
        assert_eq!(result.cost_projection.fuel_cost_projection, 100.0);
        assert_eq!(result.cost_projection.depreciation_estimate, 777.0);
        assert_eq!(result.maintenance_timeline.len(), 4);
        assert_eq!(result.maintenance_timeline[0].timeframe, Timeframe::Days(14));
    }
}
