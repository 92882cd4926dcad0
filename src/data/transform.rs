// ============================================================
// Layer 4 - Feature Transform Builder
// ============================================================
// Turns an EngineeredRecord into the fixed-width f32 vector the
// classifier consumes. The transform is built from a validated
// FeatureConfig, fitted once on the training partition and then
// frozen: inference only ever applies it.
//
// Output column layout:
//
//   [ numeric block | categorical block 1 | ... | text block ]
//
//   numeric      (x - mean) / scale, population std, scale 1 if std == 0
//   categorical  one-of-k over the sorted training vocabulary,
//                unseen values encode to all zeros
//   text         TF-IDF over 1- and 2-grams, top 300 terms,
//                smoothed idf, L2-normalised per row
//
// Reference: Rust Book §8 (Collections)
//            serde documentation (derive)

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::text::{ngrams, tokenize};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::feature_config::FeatureConfig;
use crate::domain::vehicle::{
    EngineeredRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS, TEXT_COLUMNS,
};

/// Maximum TF-IDF vocabulary size.
pub const MAX_TEXT_FEATURES: usize = 300;

// ─── ColumnTransform (unfit) ──────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ColumnTransform {
    config: FeatureConfig,
}

impl ColumnTransform {
    /// Check every configured name against the engineered column space.
    pub fn build(config: FeatureConfig) -> PipelineResult<Self> {
        check_columns(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Learn scaling statistics and vocabularies from `rows`.
    pub fn fit(&self, rows: &[EngineeredRecord]) -> PipelineResult<FittedTransform> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset(
                "cannot fit the feature transform on zero rows".to_string(),
            ));
        }

        let numeric = self
            .config
            .numeric()
            .iter()
            .map(|column| {
                let values: Vec<f64> = rows
                    .iter()
                    .map(|r| numeric_value(r, column))
                    .collect::<PipelineResult<_>>()?;
                Ok(NumericScaler::fit(column, &values))
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let categorical = self
            .config
            .categorical()
            .iter()
            .map(|column| {
                let values: Vec<&str> = rows
                    .iter()
                    .map(|r| categorical_value(r, column))
                    .collect::<PipelineResult<_>>()?;
                Ok(CategoryEncoder::fit(column, &values))
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let column = self.config.text();
        let documents: Vec<&str> = rows
            .iter()
            .map(|r| text_value(r, column))
            .collect::<PipelineResult<_>>()?;
        let text = TfidfVectorizer::fit(column, &documents, MAX_TEXT_FEATURES);

        let fitted = FittedTransform {
            config: self.config.clone(),
            numeric,
            categorical,
            text,
        };
        tracing::debug!(
            "Fitted transform on {} rows: width {} ({} numeric, {} text terms)",
            rows.len(),
            fitted.width(),
            fitted.numeric.len(),
            fitted.text.vocabulary.len(),
        );
        Ok(fitted)
    }
}

fn check_columns(config: &FeatureConfig) -> PipelineResult<()> {
    for column in config.numeric() {
        if !NUMERIC_COLUMNS.contains(&column.as_str()) {
            return Err(missing(column, "numeric"));
        }
    }
    for column in config.categorical() {
        if !CATEGORICAL_COLUMNS.contains(&column.as_str()) {
            return Err(missing(column, "categorical"));
        }
    }
    if !TEXT_COLUMNS.contains(&config.text()) {
        return Err(missing(config.text(), "text"));
    }
    Ok(())
}

fn missing(column: &str, group: &'static str) -> PipelineError {
    PipelineError::MissingColumn { column: column.to_string(), group }
}

fn numeric_value(row: &EngineeredRecord, column: &str) -> PipelineResult<f64> {
    row.numeric(column).ok_or_else(|| missing(column, "numeric"))
}

fn categorical_value<'a>(row: &'a EngineeredRecord, column: &str) -> PipelineResult<&'a str> {
    row.categorical(column).ok_or_else(|| missing(column, "categorical"))
}

fn text_value<'a>(row: &'a EngineeredRecord, column: &str) -> PipelineResult<&'a str> {
    row.text(column).ok_or_else(|| missing(column, "text"))
}

// ─── Fitted parts ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

impl NumericScaler {
    fn fit(column: &str, values: &[f64]) -> Self {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
        Self { column: column.to_string(), mean, scale }
    }

    fn apply(&self, value: f64) -> f32 {
        ((value - self.mean) / self.scale) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    pub column: String,
    /// Sorted distinct training values
    pub categories: Vec<String>,
}

impl CategoryEncoder {
    fn fit(column: &str, values: &[&str]) -> Self {
        let mut categories: Vec<String> = values
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();
        categories.sort();
        Self { column: column.to_string(), categories }
    }

    fn encode_into(&self, value: &str, out: &mut Vec<f32>) {
        let start = out.len();
        out.resize(start + self.categories.len(), 0.0);
        if let Ok(idx) = self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
            out[start + idx] = 1.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub column: String,
    /// Selected terms in sorted order; position is the output column
    pub vocabulary: Vec<String>,
    /// Smoothed inverse document frequency, parallel to `vocabulary`
    pub idf: Vec<f64>,
}

impl TfidfVectorizer {
    fn fit(column: &str, documents: &[&str], max_features: usize) -> Self {
        let analysed: Vec<Vec<String>> = documents.iter().map(|d| analyse(d)).collect();

        // Corpus frequency and document frequency per term
        let mut frequency: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for terms in &analysed {
            let mut seen = HashSet::new();
            for term in terms {
                let entry = frequency.entry(term.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(term.as_str()) {
                    entry.1 += 1;
                }
            }
        }

        // BTreeMap iterates in term order; a stable sort on count keeps it for ties.
        let mut ranked: Vec<(&str, usize, usize)> =
            frequency.into_iter().map(|(t, (count, df))| (t, count, df)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n = documents.len() as f64;
        let vocabulary = ranked.iter().map(|(t, _, _)| t.to_string()).collect();
        let idf = ranked
            .iter()
            .map(|(_, _, df)| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        Self { column: column.to_string(), vocabulary, idf }
    }

    fn encode_into(&self, document: &str, out: &mut Vec<f32>) {
        let index: HashMap<&str, usize> = self
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let mut weights = vec![0.0_f64; self.vocabulary.len()];
        for term in analyse(document) {
            if let Some(&i) = index.get(term.as_str()) {
                weights[i] += 1.0;
            }
        }
        for (w, idf) in weights.iter_mut().zip(&self.idf) {
            *w *= idf;
        }

        let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            weights.iter_mut().for_each(|w| *w /= norm);
        }
        out.extend(weights.into_iter().map(|w| w as f32));
    }
}

fn analyse(document: &str) -> Vec<String> {
    ngrams(&tokenize(document), 1, 2)
}

// ─── FittedTransform ──────────────────────────────────────────────────────────
/// The frozen, serialisable transform stored alongside the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransform {
    config: FeatureConfig,
    numeric: Vec<NumericScaler>,
    categorical: Vec<CategoryEncoder>,
    text: TfidfVectorizer,
}

impl FittedTransform {
    /// Output vector length.
    pub fn width(&self) -> usize {
        self.numeric.len()
            + self.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
            + self.text.vocabulary.len()
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Internal consistency of a deserialised transform.
    pub fn check(&self) -> PipelineResult<()> {
        check_columns(&self.config)?;
        if self.text.idf.len() != self.text.vocabulary.len() {
            return Err(PipelineError::CorruptArtifact(format!(
                "text vocabulary has {} terms but {} idf weights",
                self.text.vocabulary.len(),
                self.text.idf.len()
            )));
        }
        Ok(())
    }

    /// Transform one engineered record.
    pub fn transform_row(&self, row: &EngineeredRecord) -> PipelineResult<Vec<f32>> {
        let mut out = Vec::with_capacity(self.width());
        for scaler in &self.numeric {
            out.push(scaler.apply(numeric_value(row, &scaler.column)?));
        }
        for encoder in &self.categorical {
            encoder.encode_into(categorical_value(row, &encoder.column)?, &mut out);
        }
        self.text.encode_into(text_value(row, &self.text.column)?, &mut out);
        Ok(out)
    }

    /// Transform many rows in parallel, keeping input order.
    pub fn transform_rows(&self, rows: &[EngineeredRecord]) -> PipelineResult<Vec<Vec<f32>>> {
        rows.par_iter().map(|r| self.transform_row(r)).collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::features::{prepare_records, FeatureEngineer};
    use crate::data::fixtures;
    use crate::data::sentiment::SentimentScorer;

    fn engineered(texts: &[&str]) -> Vec<EngineeredRecord> {
        let records: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut r = fixtures::sample_record();
                r.complaint_text = text.to_string();
                r.mileage = 10_000 * (i as u32 + 1);
                r.make = if i % 2 == 0 { "Toyota" } else { "Honda" }.to_string();
                r
            })
            .collect();
        prepare_records(&records, &FeatureEngineer::default(), &SentimentScorer::default())
    }

    fn small_config() -> FeatureConfig {
        FeatureConfig::new(["mileage", "past_failures"], ["make"], "complaint_text").unwrap()
    }

    #[test]
    fn test_unknown_column_rejected() {
        let cfg = FeatureConfig::new(["horsepower"], ["make"], "complaint_text").unwrap();
        assert!(matches!(
            ColumnTransform::build(cfg),
            Err(PipelineError::MissingColumn { group: "numeric", .. })
        ));

        let cfg = FeatureConfig::new(["mileage"], ["car_age"], "complaint_text").unwrap();
        assert!(ColumnTransform::build(cfg).is_err());
    }

    #[test]
    fn test_fit_on_empty_rows_fails() {
        let t = ColumnTransform::build(FeatureConfig::default()).unwrap();
        assert!(matches!(t.fit(&[]), Err(PipelineError::EmptyDataset(_))));
    }

    #[test]
    fn test_layout_and_scaling() {
        let rows = engineered(&["brake wear", "engine stall", "brake noise"]);
        let fitted = ColumnTransform::build(small_config()).unwrap().fit(&rows).unwrap();

        // 2 numeric + 2 makes + text terms
        let text_terms = fitted.text.vocabulary.len();
        assert_eq!(fitted.width(), 2 + 2 + text_terms);

        let v = fitted.transform_row(&rows[0]).unwrap();
        assert_eq!(v.len(), fitted.width());

        // mileage 10k/20k/30k → mean 20k, population std sqrt(2/3)*10k
        let expected = (-10_000.0 / (10_000.0 * (2.0_f64 / 3.0).sqrt())) as f32;
        assert!((v[0] - expected).abs() < 1e-5);
        // past_failures is constant → scale 1, value 0
        assert_eq!(v[1], 0.0);
        // makes sorted: Honda, Toyota; row 0 is Toyota
        assert_eq!(&v[2..4], &[0.0, 1.0]);
    }

    #[test]
    fn test_unseen_category_encodes_to_zeros() {
        let rows = engineered(&["a b", "c d"]);
        let fitted = ColumnTransform::build(small_config()).unwrap().fit(&rows).unwrap();

        let mut unseen = rows[0].clone();
        unseen.record.make = "Lada".to_string();
        let v = fitted.transform_row(&unseen).unwrap();
        assert_eq!(&v[2..4], &[0.0, 0.0]);
    }

    #[test]
    fn test_text_block_is_unit_norm_or_zero() {
        let rows = engineered(&["brake wear noise", "brake wear", "", "!!!"]);
        let fitted = ColumnTransform::build(small_config()).unwrap().fit(&rows).unwrap();
        let offset = 4;

        let v = fitted.transform_row(&rows[0]).unwrap();
        let norm: f32 = v[offset..].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        let empty = fitted.transform_row(&rows[2]).unwrap();
        assert!(empty[offset..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_vocabulary_cap_prefers_frequent_terms() {
        let docs: Vec<&str> = vec!["alpha beta", "alpha gamma", "alpha delta"];
        let t = TfidfVectorizer::fit("complaint_text", &docs, 2);
        // alpha occurs 3 times; of the count-1 terms "alpha beta" is first in term order
        assert_eq!(t.vocabulary, vec!["alpha", "alpha beta"]);
        // alpha is in every document: ln(4/4) + 1
        assert!((t.idf[0] - 1.0).abs() < 1e-12);
        assert!((t.idf[1] - ((4.0_f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_deterministic_and_survives_serde() {
        let records = fixtures::synthetic_records(40, 9);
        let rows =
            prepare_records(&records, &FeatureEngineer::default(), &SentimentScorer::default());
        let fitted = ColumnTransform::build(FeatureConfig::default()).unwrap().fit(&rows).unwrap();
        assert!(fitted.text.vocabulary.len() <= MAX_TEXT_FEATURES);

        let json = serde_json::to_string(&fitted).unwrap();
        let restored: FittedTransform = serde_json::from_str(&json).unwrap();
        restored.check().unwrap();

        let a = fitted.transform_rows(&rows).unwrap();
        let b = restored.transform_rows(&rows).unwrap();
        assert_eq!(a, b);
    }
}
