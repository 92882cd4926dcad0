// ============================================================
// Layer 6 - Metrics Reporting
// ============================================================
// Two outputs, both in the reports directory:
//
//   training_loss.csv      one row per epoch, appended as the
//                          training loop runs
//   training_metrics.json  the holdout evaluation, a flat
//                          metric → value mapping
//
// Example CSV output:
//   epoch,train_loss
//   1,0.693147
//   2,0.612904
//   ...
//
// Loss should fall epoch over epoch; a flat curve near ln 2
// (0.6931) means the classifier is not separating the classes.
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineResult;

pub const LOSS_FILE: &str = "training_loss.csv";
pub const METRICS_FILE: &str = "training_metrics.json";

/// One row of the loss log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Starts at 1
    pub epoch: usize,

    /// Mean binary cross-entropy over the epoch's mini-batches
    pub train_loss: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64) -> Self {
        Self { epoch, train_loss }
    }

    /// True if this epoch beat the best loss seen so far.
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        self.train_loss < best_loss
    }
}

/// Appends per-epoch loss to training_loss.csv.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a fresh log, replacing any previous run's file.
    pub fn new(dir: impl AsRef<Path>) -> PipelineResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(LOSS_FILE);
        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "epoch,train_loss")?;
        tracing::debug!("Created loss log: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> PipelineResult<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{},{:.6}", m.epoch, m.train_loss)?;
        tracing::debug!("Logged epoch {} train_loss={:.4}", m.epoch, m.train_loss);
        Ok(())
    }

    #[cfg(test)]
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

/// Writes the holdout evaluation as JSON.
pub struct MetricsReporter {
    dir: PathBuf,
}

impl MetricsReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, metrics: &BTreeMap<String, f64>) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(METRICS_FILE);
        fs::write(&path, serde_json::to_string_pretty(metrics)?)?;
        tracing::info!("Wrote training metrics to '{}'", path.display());
        Ok(path)
    }

    #[cfg(test)]
    pub fn read(&self) -> PipelineResult<BTreeMap<String, f64>> {
        let json = fs::read_to_string(self.dir.join(METRICS_FILE))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 0.41);
        assert!(m.is_improvement(0.5));
        assert!(!m.is_improvement(0.4));
    }

    #[test]
    fn test_loss_log_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().join("reports")).unwrap();
        logger.log(&EpochMetrics::new(1, 0.693147)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.5)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["epoch,train_loss", "1,0.693147", "2,0.500000"]);
    }

    #[test]
    fn test_new_log_replaces_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        MetricsLogger::new(dir.path()).unwrap().log(&EpochMetrics::new(1, 0.9)).unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(logger.csv_path()).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_metrics_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = MetricsReporter::new(dir.path());
        let metrics: BTreeMap<String, f64> =
            [("roc_auc".to_string(), 0.81), ("accuracy".to_string(), 0.75)].into();
        reporter.write(&metrics).unwrap();
        assert_eq!(reporter.read().unwrap(), metrics);
    }
}
