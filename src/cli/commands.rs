// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their configurable flags:
//
//   train     fit the pipeline on the labelled CSV
//   predict   score one vehicle (or an array of vehicles)
//   compare   score two vehicles side by side
//   patterns  mine recurring failure phrases from complaints
//   terms     most frequent complaint words per class
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, PathBuf, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::data::complaints::{DEFAULT_TOP_PATTERNS, DEFAULT_TOP_TERMS};
use crate::data::features::DEFAULT_REFERENCE_YEAR;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the reliability model on the labelled vehicle CSV
    Train(TrainArgs),

    /// Predict failure risk, ownership cost and maintenance timeline
    Predict(PredictArgs),

    /// Predict two vehicles and show the results side by side
    Compare(CompareArgs),

    /// Most frequent failure phrases, weighted by severity
    Patterns(AnalyzeArgs),

    /// Most frequent complaint words for each reliability class
    Terms(AnalyzeArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labelled vehicle dataset (CSV with header row)
    #[arg(long, default_value = "data/car_reliability.csv")]
    pub data: PathBuf,

    /// Directory to write the trained pipeline into
    #[arg(long, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Directory for the metrics JSON and loss log
    #[arg(long, default_value = "reports")]
    pub reports: PathBuf,

    /// Year that vehicle age is measured against
    #[arg(long, default_value_t = DEFAULT_REFERENCE_YEAR)]
    pub reference_year: i32,

    /// Share of each class held out for evaluation
    #[arg(long, default_value_t = 0.25)]
    pub test_fraction: f64,

    /// Seed for the split and the batch shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of full passes through the training rows
    #[arg(long, default_value_t = 60)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 0.05)]
    pub lr: f64,

    /// Optional JSON file overriding the column groups
    #[arg(long)]
    pub feature_config: Option<PathBuf>,

    /// Optional JSON file with "positive" and "negative" word lists.
    /// Saved with the model, so predictions reuse it.
    #[arg(long)]
    pub lexicon: Option<PathBuf>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The feature config and lexicon files are read separately in
/// run_train because reading them can fail.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data,
            artifact_dir:   a.artifacts,
            reports_dir:    a.reports,
            reference_year: a.reference_year,
            test_fraction:  a.test_fraction,
            seed:           a.seed,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            learning_rate:  a.lr,
            feature_config: None,
            sentiment_lexicon: None,
        }
    }
}

/// Where the trained pipeline lives, plus optional overrides for
/// the cost and timeline rules. Shared by `predict` and `compare`.
#[derive(Args, Debug)]
pub struct ServingArgs {
    /// Directory the trained pipeline was saved to
    #[arg(long, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// JSON file overriding cost assumptions (missing fields keep defaults)
    #[arg(long)]
    pub cost_assumptions: Option<PathBuf>,

    /// JSON file overriding the maintenance timeline policy
    #[arg(long)]
    pub timeline_policy: Option<PathBuf>,
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON file holding one vehicle object or an array of them
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub serving: ServingArgs,
}

/// All arguments for the `compare` command
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// JSON file for the first vehicle
    #[arg(long)]
    pub car_a: PathBuf,

    /// JSON file for the second vehicle
    #[arg(long)]
    pub car_b: PathBuf,

    #[command(flatten)]
    pub serving: ServingArgs,
}

/// Shared by `patterns` and `terms`
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(long, default_value = "data/car_reliability.csv")]
    pub data: PathBuf,

    /// How many entries to report (patterns default 8, terms default 5)
    #[arg(long)]
    pub top: Option<usize>,
}

impl AnalyzeArgs {
    pub fn top_patterns(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP_PATTERNS)
    }

    pub fn top_terms(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP_TERMS)
    }
}
