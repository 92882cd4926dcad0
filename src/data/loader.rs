// ============================================================
// Layer 4 - Dataset Loader
// ============================================================
// Reads the reliability dataset from a headed CSV file using the
// csv crate. Columns are located by header name, so column order
// does not matter and extra columns are ignored.
//
// Failure modes:
//   file absent             → DatasetNotFound
//   expected column absent  → MalformedDataset naming every one
//   a row fails to parse    → MalformedDataset with the row number
//   no data rows            → EmptyDataset
//
// Every row passes VehicleRecord::validated before it is
// returned, so severity is clamped here, at the boundary.
//
// Reference: csv crate documentation (serde deserialisation)
//            Rust Book §9 (Error Handling)

use std::path::PathBuf;

use csv::StringRecord;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::DatasetSource;
use crate::domain::vehicle::{VehicleRecord, RAW_COLUMNS};

/// Loads vehicle rows from a CSV file.
/// Implements the DatasetSource trait from Layer 3.
#[derive(Debug, Clone)]
pub struct CsvDatasetLoader {
    path: PathBuf,
}

impl CsvDatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for CsvDatasetLoader {
    fn load_records(&self) -> PipelineResult<Vec<VehicleRecord>> {
        if !self.path.is_file() {
            return Err(PipelineError::DatasetNotFound(self.path.clone()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;

        // Position of each expected column in the file
        let headers = reader.headers()?.clone();
        let mut positions = Vec::with_capacity(RAW_COLUMNS.len());
        let mut absent = Vec::new();
        for column in RAW_COLUMNS {
            match headers.iter().position(|h| h == column) {
                Some(pos) => positions.push(pos),
                None => absent.push(column),
            }
        }
        if !absent.is_empty() {
            return Err(PipelineError::MalformedDataset(format!(
                "{} is missing column(s): {}",
                self.path.display(),
                absent.join(", ")
            )));
        }

        let canonical = StringRecord::from(RAW_COLUMNS.to_vec());
        let mut records = Vec::new();

        for (i, row) in reader.records().enumerate() {
            // Row 1 is the header
            let line = i + 2;
            let row = row?;
            let projected: StringRecord =
                positions.iter().map(|&p| row.get(p).unwrap_or("")).collect();

            let record: VehicleRecord = projected
                .deserialize(Some(&canonical))
                .map_err(|e| PipelineError::MalformedDataset(format!("row {line}: {e}")))?;
            let record = record
                .validated()
                .map_err(|e| PipelineError::MalformedDataset(format!("row {line}: {e}")))?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(PipelineError::EmptyDataset(format!(
                "{} has a header but no rows",
                self.path.display()
            )));
        }

        tracing::info!("Loaded {} vehicle records from {}", records.len(), self.path.display());
        Ok(records)
    }
}
