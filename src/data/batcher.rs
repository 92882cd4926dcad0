// ============================================================
// Layer 4 - Risk Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<EncodedSample>
// into tensors for one mini-batch.
//
// How batching works here:
//   Input:  N EncodedSamples, each with D features
//   Output: RiskBatch with features [N, D] and labels [N, 1]
//
//   All feature vectors come from the same fitted transform,
//   so every row already has the same width D. The rows are
//   flattened and reshaped:
//   [s1_f1, ..., s1_fD, s2_f1, ..., sN_fD] → [N, D]
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::EncodedSample;

// ─── RiskBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct RiskBatch<B: Backend> {
    /// Transformed features, shape [batch_size, width]
    pub features: Tensor<B, 2>,

    /// 0/1 targets, shape [batch_size, 1]
    pub labels: Tensor<B, 2, Int>,
}

// ─── RiskBatcher ──────────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct RiskBatcher;

impl RiskBatcher {
    pub fn new() -> Self {
        Self
    }
}

/// Stack feature rows into a [rows, width] tensor.
pub fn features_tensor<B: Backend>(rows: &[Vec<f32>], width: usize, device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([rows.len(), width])
}

impl<B: Backend> Batcher<B, EncodedSample, RiskBatch<B>> for RiskBatcher {
    fn batch(&self, items: Vec<EncodedSample>, device: &B::Device) -> RiskBatch<B> {
        let batch_size = items.len();
        let width = items.first().map(|s| s.width()).unwrap_or(0);

        let flat: Vec<f32> = items.iter().flat_map(|s| s.features.iter().copied()).collect();
        let labels: Vec<i32> = items.iter().map(|s| s.label).collect();

        let features =
            Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([batch_size, width]);
        let labels =
            Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device).reshape([batch_size, 1]);

        RiskBatch { features, labels }
    }
}
