// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Every command prints its result as pretty JSON on stdout;
// progress and diagnostics go through tracing on stderr.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use commands::{AnalyzeArgs, Commands, CompareArgs, PredictArgs, ServingArgs, TrainArgs};

use crate::application::{
    analyze_use_case::AnalyzeUseCase,
    predict_use_case::{parse_record, ReliabilityPredictor},
    train_use_case::{TrainConfig, TrainUseCase},
};
use crate::data::{loader::CsvDatasetLoader, sentiment::SentimentLexicon};
use crate::domain::feature_config::FeatureConfig;
use crate::domain::ownership::{CostAssumptions, CostProjector};
use crate::domain::timeline::{TimelinePolicy, TimelineSynthesizer};
use crate::domain::traits::ReliabilityEstimator;
use crate::domain::vehicle::VehicleRecord;

#[derive(Parser, Debug)]
#[command(
    name = "vehicle-reliability",
    version,
    about = "Predict vehicle failure risk and ownership cost from specs and complaint text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Compare(args)  => run_compare(args),
            Commands::Patterns(args) => run_patterns(args),
            Commands::Terms(args)    => run_terms(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on: {}", args.data.display());

    let feature_config = read_optional_json::<FeatureConfig>(args.feature_config.as_deref())?;
    let sentiment_lexicon = read_optional_json::<SentimentLexicon>(args.lexicon.as_deref())?;
    let config = TrainConfig { feature_config, sentiment_lexicon, ..TrainConfig::from(args) };

    let report = TrainUseCase::new(config).execute()?;
    print_json(&report)
}

fn load_predictor(args: &ServingArgs) -> Result<ReliabilityPredictor> {
    let mut predictor = ReliabilityPredictor::load(&args.artifacts)?;
    if let Some(a) = read_optional_json::<CostAssumptions>(args.cost_assumptions.as_deref())? {
        predictor = predictor.with_cost_projector(CostProjector::new(a));
    }
    if let Some(p) = read_optional_json::<TimelinePolicy>(args.timeline_policy.as_deref())? {
        predictor = predictor.with_timeline(TimelineSynthesizer::new(p));
    }
    Ok(predictor)
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let predictor = load_predictor(&args.serving)?;
    let input: serde_json::Value = read_json(&args.input)?;

    match input {
        serde_json::Value::Array(items) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, v)| parse_record(v).with_context(|| format!("vehicle #{i} is invalid")))
                .collect::<Result<Vec<VehicleRecord>>>()?;
            print_json(&predictor.predict_batch(&records)?)
        }
        value => print_json(&predictor.predict_json(value)?),
    }
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let predictor = load_predictor(&args.serving)?;
    let car_a = parse_record(read_json(&args.car_a)?).context("car A is invalid")?;
    let car_b = parse_record(read_json(&args.car_b)?).context("car B is invalid")?;
    print_json(&predictor.compare(&car_a, &car_b)?)
}

fn run_patterns(args: AnalyzeArgs) -> Result<()> {
    let source = CsvDatasetLoader::new(&args.data);
    let patterns = AnalyzeUseCase::new(&source).failure_patterns(args.top_patterns())?;
    print_json(&patterns)
}

fn run_terms(args: AnalyzeArgs) -> Result<()> {
    let source = CsvDatasetLoader::new(&args.data);
    let terms = AnalyzeUseCase::new(&source).terms_by_class(args.top_terms())?;
    print_json(&terms)
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("'{}' is not valid JSON", path.display()))
}

fn read_optional_json<T: serde::de::DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>> {
    path.map(read_json::<T>).transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
