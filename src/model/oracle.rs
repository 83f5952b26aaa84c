use log::debug;
use ndarray::ArrayView1;
use serde::Serialize;

use super::FactorGraphModel;
use crate::{observation::FactorGraphObservation, ModelErr, Result};

/// The outcome of one max oracle call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    /// Joint feature vector of the ground truth.
    pub psi_truth: Vec<f64>,
    /// Joint feature vector of the inferred label.
    pub psi_pred: Vec<f64>,
    /// The inferred label.
    pub argmax: FactorGraphObservation,
    /// `E(x, y_truth; w) - E(x, y_pred; w)`.
    pub score: f64,
    /// Weighted Hamming loss between ground truth and prediction.
    pub delta: f64,
}

impl ResultSet {
    /// Returns the margin violation `⟨w, psi_pred⟩ + delta - ⟨w, psi_truth⟩`.
    pub fn slack(&self, w: &[f64]) -> f64 {
        dot(w, &self.psi_pred) + self.delta - dot(w, &self.psi_truth)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    ArrayView1::from(a).dot(&ArrayView1::from(b))
}

impl FactorGraphModel {
    // E(x_i, y; w) - E(x_i, y_i; w) >= L(y_i, y) - xi_i
    // max oracle := argmin_y { E(x_i, y; w) - L(y_i, y) } when training,
    //               argmin_y { E(x_i, y; w) } otherwise
    /// Runs loss augmented (when `training`) MAP inference on one sample.
    ///
    /// # Arguments
    /// * `w` - The global weight vector, pushed into the factor types first.
    /// * `sample_index` - The index of the sample.
    /// * `training` - Whether to augment the energies with the ground truth loss.
    ///
    /// # Returns
    /// Both joint feature vectors, the inferred label, the energy gap and the loss.
    pub fn argmax(&mut self, w: &[f64], sample_index: usize, training: bool) -> Result<ResultSet> {
        let graph = self.features.sample_mut(sample_index)?;
        graph.connect_components();
        if self.config.inference.requires_tree() && !graph.is_tree_graph() {
            return Err(ModelErr::NotATree {
                index: sample_index,
            });
        }

        let verbose = self.config.verbose;
        if verbose {
            debug!(sample = sample_index; "------ example");
        }

        self.push_to_types(w)?;
        self.features
            .sample_mut(sample_index)?
            .compute_energies(&self.registry)?;

        if verbose {
            let tables = self.features.sample(sample_index)?.energy_tables();
            debug!("energy table before loss-aug: {tables:?}");
        }

        let truth = self.labels.label(sample_index)?.clone();
        let psi_truth = self.joint_feature_vector(sample_index, &truth)?;
        let energy_gt = self
            .features
            .sample(sample_index)?
            .evaluate_energy(&self.registry, truth.states())?;

        let graph = self.features.sample_mut(sample_index)?;
        if training {
            graph.loss_augmentation(&self.registry, &truth)?;

            if verbose {
                debug!("energy table after loss-aug: {:?}", graph.energy_tables());
            }
        }

        let states_star = self.inference.infer(graph, &self.registry)?;
        if training {
            graph.compute_energies(&self.registry)?;
        }
        let energy_pred = graph.evaluate_energy(&self.registry, &states_star)?;

        let y_star = FactorGraphObservation::from_states(states_star);
        let psi_pred = self.joint_feature_vector(sample_index, &y_star)?;
        let delta = self.delta_loss(&truth, &y_star)?;

        let ret = ResultSet {
            psi_truth,
            psi_pred,
            argmax: y_star,
            score: energy_gt - energy_pred,
            delta,
        };

        if verbose {
            let dot_pred = dot(w, &ret.psi_pred);
            let dot_truth = dot(w, &ret.psi_truth);

            debug!("w = {w:?}");
            debug!("psi_pred = {:?}", ret.psi_pred);
            debug!("state_pred = {:?}", ret.argmax.states());
            debug!(dot_pred = dot_pred, energy_pred = energy_pred, delta = ret.delta; "prediction");
            debug!("psi_truth = {:?}", ret.psi_truth);
            debug!("state_gt = {:?}", truth.states());
            debug!(dot_truth = dot_truth, energy_gt = energy_gt; "ground truth");
            debug!(slack = ret.slack(w), score = ret.score; "max oracle");
        }

        Ok(ret)
    }

    /// Computes the weighted Hamming distance between two labels.
    ///
    /// # Arguments
    /// * `truth` - The ground truth, whose loss weights are used.
    /// * `pred` - The predicted label.
    ///
    /// # Returns
    /// The sum of the truth's loss weights where the states differ, or an error if
    /// the labels have different lengths.
    pub fn delta_loss(
        &self,
        truth: &FactorGraphObservation,
        pred: &FactorGraphObservation,
    ) -> Result<f64> {
        let (s_truth, s_pred) = (truth.states(), pred.states());
        if s_pred.len() != s_truth.len() {
            return Err(ModelErr::SizeMismatch {
                what: "predicted states",
                got: s_pred.len(),
                expected: s_truth.len(),
            });
        }

        let loss = s_truth
            .iter()
            .zip(s_pred)
            .zip(truth.loss_weights())
            .filter(|((t, p), _)| t != p)
            .map(|(_, &weight)| weight)
            .sum();

        Ok(loss)
    }
}
