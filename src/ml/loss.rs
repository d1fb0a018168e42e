// ============================================================
// Layer 5 — Weighted Cross-Entropy
// ============================================================
// Class-weighted cross-entropy for the classifier, delegated to
// Burn's CrossEntropyLoss configured with per-class weights:
//
//   loss = -Σ_i w[y_i] · log softmax(logits_i)[y_i]  /  Σ_i w[y_i]
//
// With all weights equal it reduces to the plain mean
// cross-entropy.
//
// The component only holds the weight vector. It can be built
// from raw weights, or from ClassWeights together with the
// LabelEncoder, in which case the class order of both is
// checked first.

use burn::{nn::loss::CrossEntropyLossConfig, prelude::*};

use crate::data::{class_weights::ClassWeights, DataError};
use crate::domain::label_encoder::LabelEncoder;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCrossEntropy {
    weights: Vec<f32>,
}

impl WeightedCrossEntropy {
    /// Build from class weights, verifying they follow `encoder`'s class order.
    pub fn new(weights: &ClassWeights, encoder: &LabelEncoder) -> Result<Self, DataError> {
        weights.check_order(encoder)?;
        Ok(Self::from_weights(weights.as_slice().to_vec()))
    }

    /// Build from a raw weight per class index.
    pub fn from_weights(weights: Vec<f32>) -> Self {
        Self { weights }
    }

    pub fn num_classes(&self) -> usize {
        self.weights.len()
    }

    /// logits: [batch, num_classes], targets: [batch] → scalar loss [1]
    pub fn forward<B: Backend>(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        debug_assert_eq!(logits.dims()[1], self.weights.len(), "logit width must match weight count");

        CrossEntropyLossConfig::new()
            .with_weights(Some(self.weights.clone()))
            .init(&logits.device())
            .forward(logits, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, nn::loss::CrossEntropyLossConfig};

    type TestBackend = NdArray;

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    #[test]
    fn test_uniform_weights_match_plain_cross_entropy() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::from_floats(
            [[2.0, -1.0, 0.5], [0.1, 0.2, 0.3], [-3.0, 1.0, 1.5], [0.0, 0.0, 4.0]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 2, 1, 2], &device);

        let plain = CrossEntropyLossConfig::new()
            .init(&device)
            .forward(logits.clone(), targets.clone());
        let ours  = WeightedCrossEntropy::from_weights(vec![1.0, 1.0, 1.0]).forward(logits, targets);

        assert!((scalar(plain) - scalar(ours)).abs() < 1e-5);
    }

    #[test]
    fn test_matches_weighted_burn_loss() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::from_floats(
            [[1.0, 0.0, -1.0], [0.5, 2.5, 0.0], [0.0, 0.3, 0.9]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([2, 1, 0], &device);

        let burn_loss = CrossEntropyLossConfig::new()
            .with_weights(Some(vec![0.5, 2.0, 4.0]))
            .init(&device)
            .forward(logits.clone(), targets.clone());
        let ours = WeightedCrossEntropy::from_weights(vec![0.5, 2.0, 4.0]).forward(logits, targets);

        assert!((scalar(burn_loss) - scalar(ours)).abs() < 1e-5);
    }

    #[test]
    fn test_weighted_mean_by_hand() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::from_floats([[2.0, 0.0], [0.0, 0.0]], &device);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1], &device);

        let loss = WeightedCrossEntropy::from_weights(vec![1.0, 3.0]).forward(logits, targets);

        let nll0: f32 = (1.0 + (-2.0f32).exp()).ln();
        let nll1: f32 = 2.0f32.ln();
        let expected  = (1.0 * nll0 + 3.0 * nll1) / 4.0;
        assert!((scalar(loss) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_heavier_class_dominates() {
        let device  = Default::default();
        let logits  = Tensor::<TestBackend, 2>::from_floats([[3.0, 0.0], [3.0, 0.0]], &device);
        // First row correct and confident, second row wrong
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([0, 1], &device);

        let light = WeightedCrossEntropy::from_weights(vec![1.0, 0.1]).forward(logits.clone(), targets.clone());
        let heavy = WeightedCrossEntropy::from_weights(vec![1.0, 10.0]).forward(logits, targets);
        assert!(scalar(heavy) > scalar(light));
    }

    #[test]
    fn test_new_checks_class_order() {
        let enc     = LabelEncoder::fit(["a", "b"]);
        let weights = ClassWeights::compute(&[0usize, 1, 1], &enc).unwrap();

        let loss = WeightedCrossEntropy::new(&weights, &enc).unwrap();
        assert_eq!(loss.num_classes(), 2);
        assert_eq!(loss, WeightedCrossEntropy::from_weights(weights.as_slice().to_vec()));

        let reordered = LabelEncoder::from_classes(vec!["b".into(), "a".into()]);
        assert!(matches!(
            WeightedCrossEntropy::new(&weights, &reordered),
            Err(DataError::ClassOrderMismatch { .. })
        ));
    }
}
