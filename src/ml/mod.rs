// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn code that learns and applies the
// classifier. Data preparation lives in Layer 4; this layer
// only ever sees fixed-width f32 feature vectors.
//
// What's in this layer:
//
//   model.rs       - Logistic regression as one Linear unit
//                    with a sigmoid on top
//
//   trainer.rs     - The training loop: forward pass, BCE
//                    loss, backward pass, Adam step, per-epoch
//                    loss log
//
//   evaluation.rs  - Holdout metrics (ROC-AUC, precision,
//                    recall, F1, accuracy)
//
//   inferencer.rs  - Fitted transform + classifier applied to
//                    engineered records, one batched forward pass
//
// Both backends run on the CPU through ndarray. Autodiff wraps
// it only while training.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Backend with gradient tracking, used while training
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

/// Plain backend used for evaluation and serving
pub type InferBackend = burn::backend::NdArray;

/// Logistic-regression classifier
pub mod model;

/// Mini-batch training loop
pub mod trainer;

/// Holdout evaluation metrics
pub mod evaluation;

/// Batched probability scoring
pub mod inferencer;
