use ndarray::{Array1, Array2};

use super::FactorGraphModel;
use crate::{inference::InferenceMode, ModelErr, Result};

/// The constraints and quadratic term handed to a primal structured SVM solver.
///
/// `inequalities`/`inequality_bounds` and `equalities`/`equality_values` hold the
/// `A`, `a` and `B`, `b` linear systems, `regularization` is the quadratic term `C`.
/// Bounds are `None` when the model imposes none and the solver's defaults apply.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimalConstraints {
    pub inequalities: Array2<f64>,
    pub inequality_bounds: Array1<f64>,
    pub equalities: Array2<f64>,
    pub equality_values: Array1<f64>,
    pub lower_bound: Option<Array1<f64>>,
    pub upper_bound: Option<Array1<f64>>,
    pub regularization: Array2<f64>,
}

impl FactorGraphModel {
    /// Builds the primal optimization constraints the configured inference mode needs.
    ///
    /// In graph cut mode every pairwise binary factor type is made submodular by pinning
    /// `E(0,0) = E(1,1) = 0` and lower bounding `E(1,0)` and `E(0,1)` by zero.
    ///
    /// # Arguments
    /// * `regularization` - The scale of the identity quadratic term.
    ///
    /// # Returns
    /// The constraints, or an error if a pairwise binary type carries edge features.
    pub fn build_constraints(&self, regularization: f64) -> Result<PrimalConstraints> {
        let dim = self.total_dimension();

        let mut constraints = PrimalConstraints {
            inequalities: Array2::zeros((0, dim)),
            inequality_bounds: Array1::zeros(0),
            equalities: Array2::zeros((0, dim)),
            equality_values: Array1::zeros(0),
            lower_bound: None,
            upper_bound: None,
            regularization: Array2::eye(dim) * regularization,
        };

        match self.config.inference {
            InferenceMode::GraphCut => {
                let mut lb = Array1::from_elem(dim, f64::NEG_INFINITY);
                let mut ub = Array1::from_elem(dim, f64::INFINITY);

                for ftype in self.registry.iter() {
                    if ftype.cardinalities() != [2, 2] {
                        continue;
                    }

                    let w_dim = ftype.w_dim();
                    if w_dim != 4 {
                        return Err(ModelErr::EdgeFeaturesUnsupported {
                            id: ftype.id(),
                            w_dim,
                        });
                    }

                    let fw_map = self.registry.params_mapping(ftype.id());
                    assert_eq!(fw_map.len(), w_dim);

                    // w[0] = E(0,0), w[1] = E(1,0), w[2] = E(0,1), w[3] = E(1,1)
                    // E(0,1) + E(1,0) - E(0,0) - E(1,1) >= 0 holds with
                    // w[0] = w[3] = 0 and w[1], w[2] >= 0
                    lb[fw_map[0]] = 0.0;
                    ub[fw_map[0]] = 0.0;
                    lb[fw_map[3]] = 0.0;
                    ub[fw_map[3]] = 0.0;
                    lb[fw_map[1]] = 0.0;
                    lb[fw_map[2]] = 0.0;
                }

                constraints.lower_bound = Some(lb);
                constraints.upper_bound = Some(ub);
            }
            InferenceMode::TreeMaxProd
            | InferenceMode::LoopyMaxProd
            | InferenceMode::LpRelaxation
            | InferenceMode::TrwsMaxProd
            | InferenceMode::Gemplp => {}
        }

        Ok(constraints)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::ModelConfig,
        factor::TableFactorType,
        inference::InferenceMode,
        model::tests::{empty_model, two_node_model},
        ModelErr,
    };

    #[test]
    fn regularization_is_scaled_identity() {
        let model = two_node_model(ModelConfig::default());
        let constraints = model.build_constraints(0.5).unwrap();

        assert_eq!(constraints.regularization.dim(), (8, 8));
        assert_eq!(constraints.regularization[[3, 3]], 0.5);
        assert_eq!(constraints.regularization[[3, 4]], 0.0);
        assert_eq!(constraints.inequalities.dim(), (0, 8));
        assert!(constraints.lower_bound.is_none());
        assert!(constraints.upper_bound.is_none());
    }

    #[test]
    fn graph_cut_pins_pairwise_binary_energies() {
        let model = two_node_model(ModelConfig::new(InferenceMode::GraphCut, false));
        let constraints = model.build_constraints(1.0).unwrap();
        let lb = constraints.lower_bound.unwrap();
        let ub = constraints.upper_bound.unwrap();

        let pos = model.params_mapping(1);
        let (e00, e10, e01, e11) = (pos[0], pos[1], pos[2], pos[3]);

        assert_eq!((lb[e00], ub[e00]), (0.0, 0.0));
        assert_eq!((lb[e11], ub[e11]), (0.0, 0.0));
        assert_eq!(lb[e10], 0.0);
        assert_eq!(lb[e01], 0.0);
        assert_eq!(ub[e10], f64::INFINITY);
        assert_eq!(ub[e01], f64::INFINITY);

        for unary in model.params_mapping(0) {
            assert_eq!(lb[unary], f64::NEG_INFINITY);
            assert_eq!(ub[unary], f64::INFINITY);
        }
    }

    #[test]
    fn graph_cut_rejects_edge_features() {
        let mut model = empty_model(ModelConfig::new(InferenceMode::GraphCut, false));
        model
            .add_factor_type(Box::new(TableFactorType::zeros(4, vec![2, 2], 2)))
            .unwrap();

        let err = model.build_constraints(1.0).unwrap_err();
        assert_eq!(err, ModelErr::EdgeFeaturesUnsupported { id: 4, w_dim: 8 });
    }
}
