use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One transformed training row: the fixed-width feature vector
/// produced by the fitted transform and its 0/1 label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedSample {
    pub features: Vec<f32>,
    pub label: i32,
}

impl EncodedSample {
    pub fn width(&self) -> usize {
        self.features.len()
    }
}

pub struct RiskDataset {
    samples: Vec<EncodedSample>,
}

impl RiskDataset {
    pub fn new(samples: Vec<EncodedSample>) -> Self { Self { samples } }

    pub fn positive_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label == 1).count()
    }
}

impl Dataset<EncodedSample> for RiskDataset {
    fn get(&self, index: usize) -> Option<EncodedSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_access() {
        let ds = RiskDataset::new(vec![
            EncodedSample { features: vec![0.5, 1.0], label: 1 },
            EncodedSample { features: vec![0.0, -1.0], label: 0 },
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.positive_count(), 1);
        assert_eq!(ds.get(1).map(|s| s.width()), Some(2));
        assert!(ds.get(2).is_none());
    }
}
