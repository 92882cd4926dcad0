// ============================================================
// Layer 3 - Vehicle Domain Types
// ============================================================
// VehicleRecord is one row of the reliability dataset exactly
// as it arrives from the dataset source or from a caller at
// inference time. EngineeredRecord is the derived, read-only
// view the model consumes.
//
// Column names double as serde field names, so a CSV header or
// a JSON object with the same keys maps straight onto the struct.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};

pub const SEVERITY_MIN: f64 = 0.0;
pub const SEVERITY_MAX: f64 = 10.0;

/// Every column a dataset must provide, label included.
pub const RAW_COLUMNS: [&str; 13] = [
    "make",
    "model",
    "year",
    "mileage",
    "avg_trip_length_miles",
    "maintenance_events",
    "past_failures",
    "severity_score",
    "maintenance_cost_last_year",
    "fuel_cost_last_year",
    "complaint_text",
    "maintenance_action",
    LABEL_COLUMN,
];

pub const LABEL_COLUMN: &str = "has_mechanical_issue";

/// Numeric columns of the engineered frame.
pub const NUMERIC_COLUMNS: [&str; 15] = [
    "year",
    "mileage",
    "avg_trip_length_miles",
    "maintenance_events",
    "past_failures",
    "severity_score",
    "maintenance_cost_last_year",
    "fuel_cost_last_year",
    "car_age",
    "total_cost_last_year",
    "estimated_next_year_cost",
    "ownership_cost_score",
    "sentiment_positive",
    "sentiment_negative",
    "sentiment_net",
];

/// Categorical columns of the engineered frame.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["make", "model", "maintenance_action"];

/// Free-text columns of the engineered frame.
pub const TEXT_COLUMNS: [&str; 1] = ["complaint_text"];

/// One raw dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    /// Model year
    pub year: i32,
    pub mileage: u32,
    pub avg_trip_length_miles: f64,
    /// Maintenance events in the observation window
    pub maintenance_events: u32,
    pub past_failures: u32,
    pub severity_score: f64,
    pub maintenance_cost_last_year: f64,
    pub fuel_cost_last_year: f64,
    /// May be empty, but the field itself is required
    pub complaint_text: String,
    pub maintenance_action: String,
    /// Outcome label, present in training data only (0 or 1)
    #[serde(default)]
    pub has_mechanical_issue: Option<u8>,
}

impl VehicleRecord {
    /// Check the numeric invariants and clamp severity into range.
    ///
    /// Called at every boundary where records enter the system
    /// (dataset loading, inference input parsing).
    pub fn validated(mut self) -> PipelineResult<Self> {
        let non_negative = [
            ("avg_trip_length_miles", self.avg_trip_length_miles),
            ("maintenance_cost_last_year", self.maintenance_cost_last_year),
            ("fuel_cost_last_year", self.fuel_cost_last_year),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::InputShape(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !self.severity_score.is_finite() {
            return Err(PipelineError::InputShape(format!(
                "severity_score must be finite, got {}",
                self.severity_score
            )));
        }
        self.severity_score = self.severity_score.clamp(SEVERITY_MIN, SEVERITY_MAX);

        if let Some(label) = self.has_mechanical_issue {
            if label > 1 {
                return Err(PipelineError::InputShape(format!(
                    "{LABEL_COLUMN} must be 0 or 1, got {label}"
                )));
            }
        }

        Ok(self)
    }

    pub fn total_cost_last_year(&self) -> f64 {
        self.maintenance_cost_last_year + self.fuel_cost_last_year
    }
}

/// Positive, negative and net lexicon hits for one complaint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: i64,
    pub negative: i64,
    pub net: i64,
}

/// The derived view of a VehicleRecord consumed by the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineeredRecord {
    pub record: VehicleRecord,
    /// Reference year minus model year; negative for future model years
    pub car_age: i32,
    pub total_cost_last_year: f64,
    pub estimated_next_year_cost: f64,
    pub ownership_cost_score: f64,
    pub sentiment: SentimentScores,
}

impl EngineeredRecord {
    /// Look up a numeric column by name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        let r = &self.record;
        let value = match column {
            "year" => r.year as f64,
            "mileage" => r.mileage as f64,
            "avg_trip_length_miles" => r.avg_trip_length_miles,
            "maintenance_events" => r.maintenance_events as f64,
            "past_failures" => r.past_failures as f64,
            "severity_score" => r.severity_score,
            "maintenance_cost_last_year" => r.maintenance_cost_last_year,
            "fuel_cost_last_year" => r.fuel_cost_last_year,
            "car_age" => self.car_age as f64,
            "total_cost_last_year" => self.total_cost_last_year,
            "estimated_next_year_cost" => self.estimated_next_year_cost,
            "ownership_cost_score" => self.ownership_cost_score,
            "sentiment_positive" => self.sentiment.positive as f64,
            "sentiment_negative" => self.sentiment.negative as f64,
            "sentiment_net" => self.sentiment.net as f64,
            _ => return None,
        };
        Some(value)
    }

    /// Look up a categorical column by name.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "make" => Some(&self.record.make),
            "model" => Some(&self.record.model),
            "maintenance_action" => Some(&self.record.maintenance_action),
            _ => None,
        }
    }

    /// Look up a text column by name.
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            "complaint_text" => Some(&self.record.complaint_text),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<u8> {
        self.record.has_mechanical_issue
    }
}
