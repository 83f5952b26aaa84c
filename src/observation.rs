use serde::{Deserialize, Serialize};

use crate::{ModelErr, Result};

/// A state assignment of a factor graph, together with the per-variable loss weights
/// used when it acts as ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObservationSpec")]
pub struct FactorGraphObservation {
    states: Vec<usize>,
    loss_weights: Vec<f64>,
}

#[derive(Deserialize)]
struct ObservationSpec {
    states: Vec<usize>,
    #[serde(default)]
    loss_weights: Vec<f64>,
}

impl TryFrom<ObservationSpec> for FactorGraphObservation {
    type Error = ModelErr;

    fn try_from(spec: ObservationSpec) -> Result<Self> {
        Self::new(spec.states, spec.loss_weights)
    }
}

impl FactorGraphObservation {
    /// Creates a new `FactorGraphObservation`.
    ///
    /// # Arguments
    /// * `states` - One state per variable.
    /// * `loss_weights` - One weight per variable, or empty to weigh every variable
    ///   with `1 / states.len()`.
    ///
    /// # Returns
    /// An error if `loss_weights` is neither empty nor as long as `states`.
    pub fn new(states: Vec<usize>, loss_weights: Vec<f64>) -> Result<Self> {
        let loss_weights = if loss_weights.is_empty() && !states.is_empty() {
            vec![1.0 / states.len() as f64; states.len()]
        } else {
            loss_weights
        };

        if loss_weights.len() != states.len() {
            return Err(ModelErr::SizeMismatch {
                what: "loss weights",
                got: loss_weights.len(),
                expected: states.len(),
            });
        }

        Ok(Self {
            states,
            loss_weights,
        })
    }

    /// Creates an observation with the default uniform loss weights.
    pub fn from_states(states: Vec<usize>) -> Self {
        let n = states.len();
        Self {
            loss_weights: vec![1.0 / n as f64; n],
            states,
        }
    }

    pub fn states(&self) -> &[usize] {
        &self.states
    }

    pub fn loss_weights(&self) -> &[f64] {
        &self.loss_weights
    }
}
