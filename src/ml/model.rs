use burn::{
    nn::{
        loss::BinaryCrossEntropyLossConfig,
        Initializer, Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::sigmoid, backend::AutodiffBackend},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RiskClassifierConfig {
    /// Width of the transformed feature vector
    pub d_input: usize,
}

impl RiskClassifierConfig {
    /// Weights and bias start at zero so every run from the same
    /// data and seed lands on the same parameters.
    pub fn init<B: Backend>(&self, device: &B::Device) -> RiskClassifier<B> {
        let head = LinearConfig::new(self.d_input, 1)
            .with_initializer(Initializer::Zeros)
            .init(device);
        RiskClassifier { head }
    }
}

/// Logistic regression: one linear unit over the feature vector.
#[derive(Module, Debug)]
pub struct RiskClassifier<B: Backend> {
    pub head: Linear<B>,
}

impl<B: Backend> RiskClassifier<B> {
    /// features: [batch, d_input] → logits: [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.head.forward(features)
    }

    /// P(has_mechanical_issue = 1), shape [batch, 1]
    pub fn probabilities(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.forward(features))
    }

    pub fn d_input(&self) -> usize {
        self.head.weight.dims()[0]
    }

    pub fn forward_loss(&self, features: Tensor<B, 2>, labels: Tensor<B, 2, Int>) -> Tensor<B, 1>
    where
        B: AutodiffBackend,
    {
        let logits = self.forward(features);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        bce.forward(logits, labels)
    }
}
