// ============================================================
// Layer 3 - Feature Group Configuration
// ============================================================
// Declares which engineered columns feed the model and how:
//   numeric      → standardised
//   categorical  → one-of-k encoded
//   text         → TF-IDF over 1- and 2-grams
//
// The value is immutable once constructed and passed explicitly
// to the transform builder and the training protocol.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureConfig")]
pub struct FeatureConfig {
    numeric: Vec<String>,
    categorical: Vec<String>,
    text: String,
}

// Unvalidated mirror used only for deserialisation.
#[derive(Deserialize)]
struct RawFeatureConfig {
    numeric: Vec<String>,
    categorical: Vec<String>,
    text: String,
}

impl TryFrom<RawFeatureConfig> for FeatureConfig {
    type Error = PipelineError;

    fn try_from(raw: RawFeatureConfig) -> PipelineResult<Self> {
        FeatureConfig::new(raw.numeric, raw.categorical, raw.text)
    }
}

impl FeatureConfig {
    /// Build a configuration, rejecting empty, duplicated or overlapping names.
    pub fn new<N, C>(numeric: N, categorical: C, text: impl Into<String>) -> PipelineResult<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let numeric: Vec<String> = numeric.into_iter().map(Into::into).collect();
        let categorical: Vec<String> = categorical.into_iter().map(Into::into).collect();
        let text = text.into();

        let mut seen = HashSet::new();
        let all = numeric
            .iter()
            .chain(categorical.iter())
            .chain(std::iter::once(&text));
        for name in all {
            if name.trim().is_empty() {
                return Err(PipelineError::Configuration(
                    "feature names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::Configuration(format!(
                    "feature '{name}' is declared more than once across feature groups"
                )));
            }
        }

        Ok(Self { numeric, categorical, text })
    }

    pub fn numeric(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            numeric: [
                "mileage",
                "avg_trip_length_miles",
                "maintenance_events",
                "past_failures",
                "severity_score",
                "car_age",
                "total_cost_last_year",
            ]
            .map(String::from)
            .to_vec(),
            categorical: ["make", "model", "maintenance_action"].map(String::from).to_vec(),
            text: "complaint_text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_rejected() {
        let err = FeatureConfig::new(["mileage", "make"], ["make"], "complaint_text");
        assert!(matches!(err, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_text_overlapping_numeric_rejected() {
        let err = FeatureConfig::new(["complaint_text"], Vec::<String>::new(), "complaint_text");
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(FeatureConfig::new(["mileage"], ["make"], " ").is_err());
    }

    #[test]
    fn test_deserialisation_validates() {
        let bad = r#"{"numeric":["mileage"],"categorical":["mileage"],"text":"complaint_text"}"#;
        assert!(serde_json::from_str::<FeatureConfig>(bad).is_err());

        let good = r#"{"numeric":["mileage"],"categorical":["make"],"text":"complaint_text"}"#;
        let cfg: FeatureConfig = serde_json::from_str(good).unwrap();
        assert_eq!(cfg.numeric(), ["mileage".to_string()]);
    }

    #[test]
    fn test_default_groups_are_disjoint() {
        let d = FeatureConfig::default();
        let rebuilt = FeatureConfig::new(
            d.numeric().to_vec(),
            d.categorical().to_vec(),
            d.text(),
        );
        assert_eq!(rebuilt.unwrap(), d);
    }
}
