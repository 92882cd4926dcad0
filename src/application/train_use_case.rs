// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the training protocol as a typestate chain, so
// a step can only run once the step before it has succeeded:
//
//   Unloaded ─load─▶ Loaded ─split─▶ Split ─fit─▶ Fitted
//       ─evaluate─▶ Evaluated ─persist─▶ Persisted
//
//   load      read the dataset, require a label on every row,
//             engineer features and sentiment        (Layer 4)
//   split     stratified 75/25 on the label, seeded  (Layer 4)
//   fit       fit the transform, then the classifier,
//             on the training partition only         (Layers 4-5)
//   evaluate  holdout metrics at threshold 0.5       (Layer 5)
//   persist   artifact + metrics report              (Layer 6)
//
// Any failure aborts the run; nothing is retried.
//
// Reference: Rust Book §17 (Encoding States and Behaviour as Types)
//            Burn Book §5 (Training)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{EncodedSample, RiskDataset},
    features::{prepare_records, FeatureEngineer, DEFAULT_REFERENCE_YEAR},
    sentiment::{SentimentLexicon, SentimentScorer},
    splitter::stratified_split,
    transform::{ColumnTransform, FittedTransform},
};
use crate::domain::error::PipelineError;
use crate::domain::feature_config::FeatureConfig;
use crate::domain::traits::DatasetSource;
use crate::domain::vehicle::EngineeredRecord;
use crate::infra::{
    checkpoint::{ArtifactManifest, ArtifactStore},
    metrics::{MetricsLogger, MetricsReporter},
};
use crate::ml::{
    evaluation::EvaluationMetrics, inferencer::Inferencer, model::RiskClassifier,
    trainer::run_training, InferBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run needs. Serialisable so a run can be
// described in a JSON file as well as on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      PathBuf,
    pub artifact_dir:   PathBuf,
    pub reports_dir:    PathBuf,
    pub reference_year: i32,
    pub test_fraction:  f64,
    pub seed:           u64,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub learning_rate:  f64,
    /// None means FeatureConfig::default()
    #[serde(default)]
    pub feature_config: Option<FeatureConfig>,
    /// None means SentimentLexicon::default(). Saved in the artifact.
    #[serde(default)]
    pub sentiment_lexicon: Option<SentimentLexicon>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      PathBuf::from("data/car_reliability.csv"),
            artifact_dir:   PathBuf::from("artifacts"),
            reports_dir:    PathBuf::from("reports"),
            reference_year: DEFAULT_REFERENCE_YEAR,
            test_fraction:  0.25,
            seed:           42,
            epochs:         60,
            batch_size:     32,
            learning_rate:  0.05,
            feature_config: None,
            sentiment_lexicon: None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(PipelineError::Configuration(
                "epochs and batch size must both be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(PipelineError::Configuration(format!(
                "learning rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::Configuration(format!(
                "test fraction must lie strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }

    pub fn features(&self) -> FeatureConfig {
        self.feature_config.clone().unwrap_or_default()
    }
}

// ─── Protocol states ──────────────────────────────────────────────────────────
pub struct Unloaded;

pub struct Loaded {
    rows: Vec<EngineeredRecord>,
}

pub struct Split {
    train:   Vec<EngineeredRecord>,
    holdout: Vec<EngineeredRecord>,
}

pub struct Fitted {
    inferencer: Inferencer,
    holdout:    Vec<EngineeredRecord>,
    train_rows: usize,
}

pub struct Evaluated {
    inferencer:   Inferencer,
    metrics:      EvaluationMetrics,
    train_rows:   usize,
    holdout_rows: usize,
}

pub struct Persisted {
    report: TrainingReport,
}

/// Summary of a completed run, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub artifact_dir:  PathBuf,
    pub train_rows:    usize,
    pub holdout_rows:  usize,
    pub feature_width: usize,
    pub metrics:       EvaluationMetrics,
}

/// One training run, parameterised by how far it has progressed.
pub struct TrainingRun<S> {
    config:   TrainConfig,
    engineer: FeatureEngineer,
    scorer:   SentimentScorer,
    state:    S,
}

impl<S> TrainingRun<S> {
    fn advance<T>(self, state: T) -> TrainingRun<T> {
        TrainingRun {
            config: self.config,
            engineer: self.engineer,
            scorer: self.scorer,
            state,
        }
    }
}

impl TrainingRun<Unloaded> {
    pub fn new(config: TrainConfig) -> Self {
        Self {
            engineer: FeatureEngineer::new(config.reference_year),
            scorer: SentimentScorer::new(config.sentiment_lexicon.clone().unwrap_or_default()),
            config,
            state: Unloaded,
        }
    }

    pub fn load(self, source: &dyn DatasetSource) -> Result<TrainingRun<Loaded>> {
        self.config.validate()?;
        let records = source.load_records().context("Failed to load training data")?;

        let unlabelled = records.iter().filter(|r| r.has_mechanical_issue.is_none()).count();
        if unlabelled > 0 {
            return Err(PipelineError::MalformedDataset(format!(
                "{unlabelled} of {} rows have no has_mechanical_issue label",
                records.len()
            ))
            .into());
        }

        let rows = prepare_records(&records, &self.engineer, &self.scorer);
        tracing::info!("Loaded: {} labelled rows engineered", rows.len());
        Ok(self.advance(Loaded { rows }))
    }
}

impl TrainingRun<Loaded> {
    pub fn split(self) -> Result<TrainingRun<Split>> {
        let (fraction, seed) = (self.config.test_fraction, self.config.seed);
        let rows = self.state.rows;
        let (train, holdout) = stratified_split(rows, |r| r.label().unwrap_or(0), fraction, seed)
            .context("Failed to split the dataset")?;
        tracing::info!("Split: {} train, {} holdout", train.len(), holdout.len());
        Ok(TrainingRun {
            config: self.config,
            engineer: self.engineer,
            scorer: self.scorer,
            state: Split { train, holdout },
        })
    }
}

impl TrainingRun<Split> {
    pub fn fit(self) -> Result<TrainingRun<Fitted>> {
        let cfg = &self.config;
        let Split { train, .. } = &self.state;

        let transform = ColumnTransform::build(cfg.features())
            .context("Invalid feature configuration")?
            .fit(train)?;

        let samples = encode(&transform, train)?;
        let logger = MetricsLogger::new(&cfg.reports_dir)
            .with_context(|| format!("Cannot create reports in '{}'", cfg.reports_dir.display()))?;
        let model: RiskClassifier<InferBackend> =
            run_training(cfg, RiskDataset::new(samples), transform.width(), &logger)?;

        let inferencer = Inferencer::new(model, transform)?;
        tracing::info!("Fitted: transform width {}", inferencer.transform().width());

        let train_rows = train.len();
        let TrainingRun { config, engineer, scorer, state } = self;
        Ok(TrainingRun {
            config,
            engineer,
            scorer,
            state: Fitted { inferencer, holdout: state.holdout, train_rows },
        })
    }
}

fn encode(
    transform: &FittedTransform,
    rows: &[EngineeredRecord],
) -> Result<Vec<EncodedSample>, PipelineError> {
    let features = transform.transform_rows(rows)?;
    Ok(features
        .into_iter()
        .zip(rows)
        .map(|(features, row)| EncodedSample {
            features,
            label: i32::from(row.label().unwrap_or(0)),
        })
        .collect())
}

impl TrainingRun<Fitted> {
    pub fn evaluate(self) -> Result<TrainingRun<Evaluated>> {
        let Fitted { inferencer, holdout, train_rows } = self.state;

        let probabilities = inferencer.predict_proba(&holdout)?;
        let labels: Vec<u8> = holdout.iter().map(|r| r.label().unwrap_or(0)).collect();
        let metrics = EvaluationMetrics::compute(&labels, &probabilities);

        tracing::info!(
            "Evaluated on {} holdout rows: roc_auc={:.3} f1={:.3} accuracy={:.3}",
            holdout.len(),
            metrics.roc_auc,
            metrics.f1_high_risk,
            metrics.accuracy,
        );

        Ok(TrainingRun {
            config: self.config,
            engineer: self.engineer,
            scorer: self.scorer,
            state: Evaluated { inferencer, metrics, train_rows, holdout_rows: holdout.len() },
        })
    }
}

impl TrainingRun<Evaluated> {
    pub fn persist(
        self,
        store: &ArtifactStore,
        reporter: &MetricsReporter,
    ) -> Result<TrainingRun<Persisted>> {
        let Evaluated { inferencer, metrics, train_rows, holdout_rows } = &self.state;
        let transform = inferencer.transform();

        let manifest = ArtifactManifest::new(
            transform.width(),
            self.engineer.reference_year(),
            transform.config().clone(),
            self.scorer.lexicon().clone(),
            metrics.to_map(),
        );
        store
            .save(transform, inferencer.model(), &manifest)
            .with_context(|| format!("Failed to save artifact to '{}'", store.dir().display()))?;
        reporter.write(&manifest.metrics).context("Failed to write metrics report")?;

        let report = TrainingReport {
            artifact_dir: store.dir().to_path_buf(),
            train_rows: *train_rows,
            holdout_rows: *holdout_rows,
            feature_width: transform.width(),
            metrics: *metrics,
        };
        tracing::info!("Persisted: artifact in '{}'", report.artifact_dir.display());
        Ok(self.advance(Persisted { report }))
    }
}

impl TrainingRun<Persisted> {
    pub fn into_report(self) -> TrainingReport {
        self.state.report
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the whole protocol against the CSV
// dataset and artifact directory it names.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingReport> {
        let cfg = &self.config;
        tracing::info!("Training from '{}'", cfg.data_path.display());

        let source = crate::data::loader::CsvDatasetLoader::new(&cfg.data_path);
        let store = ArtifactStore::new(&cfg.artifact_dir);
        let reporter = MetricsReporter::new(&cfg.reports_dir);

        let run = TrainingRun::new(cfg.clone())
            .load(&source)?
            .split()?
            .fit()?
            .evaluate()?
            .persist(&store, &reporter)?;
        Ok(run.into_report())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::domain::error::PipelineResult;
    use crate::domain::vehicle::VehicleRecord;
    use std::path::Path;

    struct InMemory(Vec<VehicleRecord>);

    impl DatasetSource for InMemory {
        fn load_records(&self) -> PipelineResult<Vec<VehicleRecord>> {
            Ok(self.0.clone())
        }
    }

    fn quick_config(root: &Path) -> TrainConfig {
        TrainConfig {
            data_path: root.join("cars.csv"),
            artifact_dir: root.join("artifacts"),
            reports_dir: root.join("reports"),
            epochs: 30,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let c = TrainConfig::default();
        assert_eq!((c.test_fraction, c.seed, c.epochs, c.batch_size), (0.25, 42, 60, 32));
        assert!(c.validate().is_ok());
        assert_eq!(c.features(), FeatureConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { epochs: 0, ..quick_config(dir.path()) };
        let result = TrainingRun::new(cfg).load(&InMemory(fixtures::synthetic_records(20, 1)));
        assert!(result.is_err());
    }

    #[test]
    fn test_unlabelled_rows_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = fixtures::synthetic_records(20, 1);
        records[3].has_mechanical_issue = None;
        let err = TrainingRun::new(quick_config(dir.path()))
            .load(&InMemory(records))
            .err()
            .unwrap();
        assert!(err.to_string().contains("1 of 20"));
    }

    #[test]
    fn test_split_is_stratified() {
        let dir = tempfile::tempdir().unwrap();
        let records = fixtures::synthetic_records(120, 4);
        let positives = records.iter().filter(|r| r.has_mechanical_issue == Some(1)).count();

        let run = TrainingRun::new(quick_config(dir.path()))
            .load(&InMemory(records))
            .unwrap()
            .split()
            .unwrap();
        let Split { train, holdout } = &run.state;
        assert_eq!(train.len() + holdout.len(), 120);
        let held_pos = holdout.iter().filter(|r| r.label() == Some(1)).count();
        assert_eq!(held_pos, ((positives as f64) * 0.25).round() as usize);
    }

    #[test]
    fn test_full_protocol_learns_signal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = quick_config(dir.path());
        let store = ArtifactStore::new(&cfg.artifact_dir);
        let reporter = MetricsReporter::new(&cfg.reports_dir);

        let run = TrainingRun::new(cfg.clone())
            .load(&InMemory(fixtures::synthetic_records(240, 11)))
            .unwrap()
            .split()
            .unwrap()
            .fit()
            .unwrap()
            .evaluate()
            .unwrap();
        let roc_auc = run.state.metrics.roc_auc;
        assert!(roc_auc > 0.7, "auc {roc_auc}");

        let report = run.persist(&store, &reporter).unwrap().into_report();
        assert!(store.exists());
        assert_eq!(report.train_rows + report.holdout_rows, 240);

        let saved = reporter.read().unwrap();
        assert_eq!(saved["roc_auc"], report.metrics.roc_auc);
        let loss_log = std::fs::read_to_string(cfg.reports_dir.join("training_loss.csv")).unwrap();
        assert_eq!(loss_log.lines().count(), cfg.epochs + 1);
    }

    #[test]
    fn test_use_case_reads_csv_and_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { epochs: 5, ..quick_config(dir.path()) };
        fixtures::write_csv(&cfg.data_path, &fixtures::synthetic_records(80, 21));

        let first = TrainUseCase::new(cfg.clone()).execute().unwrap();
        let second = TrainUseCase::new(cfg).execute().unwrap();
        assert_eq!(first.metrics, second.metrics);
    }

    #[test]
    fn test_configured_lexicon_reaches_features_and_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = SentimentLexicon::new(["battery"], ["engine"]).unwrap();
        let cfg = TrainConfig {
            epochs: 3,
            sentiment_lexicon: Some(lexicon.clone()),
            ..quick_config(dir.path())
        };
        let records = fixtures::synthetic_records(60, 6);
        let expected = SentimentScorer::new(lexicon.clone()).score(&records[0].complaint_text);

        let run = TrainingRun::new(cfg.clone()).load(&InMemory(records)).unwrap();
        assert_eq!(run.state.rows[0].sentiment, expected);

        let store = ArtifactStore::new(&cfg.artifact_dir);
        run.split()
            .unwrap()
            .fit()
            .unwrap()
            .evaluate()
            .unwrap()
            .persist(&store, &MetricsReporter::new(&cfg.reports_dir))
            .unwrap();
        assert_eq!(store.load_manifest().unwrap().sentiment_lexicon, lexicon);
    }

    #[test]
    fn test_missing_dataset_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainUseCase::new(quick_config(dir.path())).execute().unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("Dataset not found"), "{root}");
    }
}
