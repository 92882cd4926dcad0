// ============================================================
// Layer 6 - Artifact Store
// ============================================================
// Persists the trained pipeline as one directory:
//
//   artifacts/
//     transform.json    ← fitted feature transform (serde_json)
//     classifier.mpk    ← classifier weights (Burn DefaultRecorder)
//     manifest.json     ← format version, crate version, feature
//                         width, reference year, feature config,
//                         sentiment lexicon, holdout metrics
//
// The manifest is written LAST. A directory without one is
// treated as "no trained model", so a crash mid-save never
// leaves a half-written pipeline that looks loadable.
//
// On load:
//   - no manifest                       → ArtifactMissing
//   - format version differs            → ArtifactVersion
//   - transform width ≠ manifest width  → CorruptArtifact
//
// Burn's DefaultRecorder:
//   - Named MessagePack at full precision, so reloaded weights
//     give bit-identical probabilities
//   - Type-safe: loading fails if the architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use burn::{
    prelude::*,
    record::{DefaultRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::data::{sentiment::SentimentLexicon, transform::FittedTransform};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::feature_config::FeatureConfig;
use crate::ml::model::{RiskClassifier, RiskClassifierConfig};

/// Bumped whenever the on-disk layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 2;

const MANIFEST_FILE: &str = "manifest.json";
const TRANSFORM_FILE: &str = "transform.json";
// The recorder appends its own .mpk extension
const CLASSIFIER_STEM: &str = "classifier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub crate_version: String,
    pub feature_width: usize,
    pub reference_year: i32,
    pub feature_config: FeatureConfig,
    /// Word lists the sentiment columns were computed with
    pub sentiment_lexicon: SentimentLexicon,
    pub metrics: BTreeMap<String, f64>,
}

impl ArtifactManifest {
    pub fn new(
        feature_width: usize,
        reference_year: i32,
        feature_config: FeatureConfig,
        sentiment_lexicon: SentimentLexicon,
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            feature_width,
            reference_year,
            feature_config,
            sentiment_lexicon,
            metrics,
        }
    }
}

/// A fully loaded and cross-checked trained pipeline.
#[derive(Debug)]
pub struct LoadedArtifact<B: Backend> {
    pub manifest: ArtifactManifest,
    pub transform: FittedTransform,
    pub model: RiskClassifier<B>,
}

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True once a complete artifact has been saved.
    #[cfg(test)]
    pub fn exists(&self) -> bool {
        self.dir.join(MANIFEST_FILE).is_file()
    }

    pub fn save<B: Backend>(
        &self,
        transform: &FittedTransform,
        model: &RiskClassifier<B>,
        manifest: &ArtifactManifest,
    ) -> PipelineResult<()> {
        if transform.width() != manifest.feature_width || model.d_input() != manifest.feature_width
        {
            return Err(PipelineError::CorruptArtifact(format!(
                "refusing to save: transform width {}, classifier width {}, manifest width {}",
                transform.width(),
                model.d_input(),
                manifest.feature_width
            )));
        }

        fs::create_dir_all(&self.dir)?;
        // An old manifest must not vouch for new, partially written parts
        let manifest_path = self.dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            fs::remove_file(&manifest_path)?;
        }

        fs::write(self.dir.join(TRANSFORM_FILE), serde_json::to_string(transform)?)?;

        let recorder = DefaultRecorder::new();
        <DefaultRecorder as Recorder<B>>::record(
            &recorder,
            model.clone().into_record(),
            self.dir.join(CLASSIFIER_STEM),
        )
        .map_err(|e| PipelineError::Recorder(e.to_string()))?;

        fs::write(&manifest_path, serde_json::to_string_pretty(manifest)?)?;
        tracing::info!(
            "Saved artifact (width {}) to '{}'",
            manifest.feature_width,
            self.dir.display()
        );
        Ok(())
    }

    pub fn load_manifest(&self) -> PipelineResult<ArtifactManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(PipelineError::ArtifactMissing(self.dir.clone()));
        }

        // Check the version before trusting the rest of the schema
        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let found = raw
            .get("format_version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                PipelineError::CorruptArtifact("manifest has no format_version".to_string())
            })?;
        if found != u64::from(ARTIFACT_FORMAT_VERSION) {
            return Err(PipelineError::ArtifactVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        Ok(serde_json::from_value(raw)?)
    }

    pub fn load<B: Backend>(&self, device: &B::Device) -> PipelineResult<LoadedArtifact<B>> {
        let manifest = self.load_manifest()?;

        let transform_path = self.dir.join(TRANSFORM_FILE);
        if !transform_path.is_file() {
            return Err(PipelineError::ArtifactMissing(self.dir.clone()));
        }
        let transform: FittedTransform =
            serde_json::from_str(&fs::read_to_string(&transform_path)?)?;
        transform.check()?;

        if transform.width() != manifest.feature_width {
            return Err(PipelineError::CorruptArtifact(format!(
                "transform width {} does not match manifest width {}",
                transform.width(),
                manifest.feature_width
            )));
        }
        if transform.config() != &manifest.feature_config {
            return Err(PipelineError::CorruptArtifact(
                "transform feature config does not match manifest".to_string(),
            ));
        }

        let recorder = DefaultRecorder::new();
        let record = <DefaultRecorder as Recorder<B>>::load(
            &recorder,
            self.dir.join(CLASSIFIER_STEM),
            device,
        )
        .map_err(|e| PipelineError::Recorder(e.to_string()))?;
        let model = RiskClassifierConfig::new(manifest.feature_width)
            .init::<B>(device)
            .load_record(record);

        tracing::info!(
            "Loaded artifact (width {}, reference year {}) from '{}'",
            manifest.feature_width,
            manifest.reference_year,
            self.dir.display()
        );
        Ok(LoadedArtifact { manifest, transform, model })
    }
}
