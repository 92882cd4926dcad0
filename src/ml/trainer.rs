// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Mini-batch Adam on binary cross-entropy using Burn's
// DataLoader.
//
// Key points:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() hands back the same weights on InferBackend
//   - The DataLoader shuffle is seeded, and the classifier starts
//     from zero weights, so a given seed always yields the same
//     parameters
//   - Every epoch's mean loss goes to training_loss.csv
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{RiskBatch, RiskBatcher},
    dataset::{EncodedSample, RiskDataset},
};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{RiskClassifier, RiskClassifierConfig};
use crate::ml::{InferBackend, TrainBackend};

pub fn run_training(
    cfg: &TrainConfig,
    train_dataset: RiskDataset,
    width: usize,
    logger: &MetricsLogger,
) -> PipelineResult<RiskClassifier<InferBackend>> {
    if width == 0 {
        return Err(PipelineError::Configuration(
            "the fitted transform produced zero feature columns".to_string(),
        ));
    }
    let device = burn::backend::ndarray::NdArrayDevice::default();
    TrainBackend::seed(&device, cfg.seed);
    train_loop(cfg, train_dataset, width, logger, device)
}

fn train_loop(
    cfg: &TrainConfig,
    train_dataset: RiskDataset,
    width: usize,
    logger: &MetricsLogger,
    device: burn::backend::ndarray::NdArrayDevice,
) -> PipelineResult<RiskClassifier<InferBackend>> {
    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: RiskClassifier<TrainBackend> = RiskClassifierConfig::new(width).init(&device);
    tracing::info!(
        "Classifier ready: {} inputs, {} training rows ({} positive)",
        width,
        train_dataset.len(),
        train_dataset.positive_count(),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Training data loader ──────────────────────────────────────────────────
    let train_loader =
        DataLoaderBuilder::<TrainBackend, EncodedSample, RiskBatch<TrainBackend>>::new(
            RiskBatcher::new(),
        )
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .set_device(device.clone())
        .build(train_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut best_loss = f64::INFINITY;
    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches = 0usize;

        for batch in train_loader.iter() {
            let loss = model.forward_loss(batch.features, batch.labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val;
            batches += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let avg_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        if !avg_loss.is_finite() {
            return Err(PipelineError::Tensor(format!(
                "training loss became {avg_loss} at epoch {epoch}"
            )));
        }

        let metrics = EpochMetrics::new(epoch, avg_loss);
        logger.log(&metrics)?;
        if metrics.is_improvement(best_loss) {
            best_loss = avg_loss;
        }

        if epoch == 1 || epoch % 10 == 0 || epoch == cfg.epochs {
            tracing::info!("Epoch {:>3}/{} | train_loss={:.4}", epoch, cfg.epochs, avg_loss);
        }
    }

    tracing::info!("Training complete, best epoch loss {:.4}", best_loss);
    Ok(model.valid())
}
