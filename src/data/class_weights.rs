// ============================================================
// Layer 4 — Class Weights
// ============================================================
// Inverse-frequency weights that rebalance the loss:
//
//   weight[c] = (N_train / num_classes) / count(c)
//
// A class seen half as often as average gets weight 2, one seen
// twice as often gets 0.5.
//
// Only the training partition is counted. Validation and test
// rows never influence the weights.
//
// The vector is indexed by class id, so it is only meaningful
// together with the LabelEncoder that produced those ids. We keep
// a copy of the encoder's class list and the loss checks it
// before training starts.

use serde::{Deserialize, Serialize};

use crate::data::DataError;
use crate::domain::issue::Labeled;
use crate::domain::label_encoder::LabelEncoder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    weights: Vec<f32>,
    classes: Vec<String>,
}

impl ClassWeights {
    /// Count labels in `train` and derive one weight per encoder class.
    ///
    /// Fails if any class has no training rows (its weight would be a
    /// division by zero) or if a label is outside the encoder's range.
    pub fn compute<T: Labeled>(train: &[T], encoder: &LabelEncoder) -> Result<Self, DataError> {
        let num_classes = encoder.len();
        let mut counts  = vec![0usize; num_classes];

        for item in train {
            let label = item.label();
            let slot  = counts
                .get_mut(label)
                .ok_or(DataError::LabelOutOfRange { label, num_classes })?;
            *slot += 1;
        }

        if let Some(class) = counts.iter().position(|&c| c == 0) {
            return Err(DataError::MissingClass {
                class,
                name: encoder.decode(class).unwrap_or_default().to_string(),
            });
        }

        let per_class = train.len() as f64 / num_classes as f64;
        let weights   = counts
            .iter()
            .map(|&count| (per_class / count as f64) as f32)
            .collect();

        Ok(Self {
            weights,
            classes: encoder.classes().to_vec(),
        })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Class names in weight order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Fails unless these weights were computed against `encoder`'s ordering.
    pub fn check_order(&self, encoder: &LabelEncoder) -> Result<(), DataError> {
        if self.classes.as_slice() != encoder.classes() {
            return Err(DataError::ClassOrderMismatch {
                weights: self.classes.clone(),
                encoder: encoder.classes().to_vec(),
            });
        }
        Ok(())
    }
}
