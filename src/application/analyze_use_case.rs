// ============================================================
// Layer 2 - Analyze Use Case
// ============================================================
// Complaint analytics over the labelled dataset. Read-only: it
// never touches the trained artifact.
//
// A dataset with a header but no rows yields empty results. A
// missing or malformed file is still an error.
//
//   patterns  recurring 2-3 word phrases, severity weighted
//   terms     most frequent words per reliability class

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::data::complaints::{discriminative_terms, frequent_patterns, FailurePattern};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::DatasetSource;
use crate::domain::vehicle::VehicleRecord;

pub struct AnalyzeUseCase<'a> {
    source: &'a dyn DatasetSource,
}

impl<'a> AnalyzeUseCase<'a> {
    pub fn new(source: &'a dyn DatasetSource) -> Self {
        Self { source }
    }

    fn records(&self) -> Result<Vec<VehicleRecord>> {
        let loaded: PipelineResult<Vec<VehicleRecord>> = match self.source.load_records() {
            Err(PipelineError::EmptyDataset(detail)) => {
                tracing::warn!("No complaints to analyse: {detail}");
                Ok(Vec::new())
            }
            other => other,
        };
        loaded.context("Failed to load complaint data")
    }

    pub fn failure_patterns(&self, top_n: usize) -> Result<Vec<FailurePattern>> {
        let records = self.records()?;
        let patterns = frequent_patterns(&records, top_n);
        tracing::info!("Found {} failure patterns in {} complaints", patterns.len(), records.len());
        Ok(patterns)
    }

    pub fn terms_by_class(&self, top_n: usize) -> Result<BTreeMap<String, Vec<String>>> {
        let records = self.records()?;
        Ok(discriminative_terms(&records, top_n))
    }
}
