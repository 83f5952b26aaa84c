use std::collections::HashMap;

use super::FactorGraphModel;
use crate::{
    factor::FactorTypeId, observation::FactorGraphObservation, ModelErr, Result,
};

impl FactorGraphModel {
    /// Computes the joint feature vector of a sample under a label.
    ///
    /// Every factor adds its data into the slots its type owns for the factor's
    /// assignment under `label`, and the whole vector is negated, so that
    /// `⟨w, psi⟩` equals minus the total energy of the graph.
    ///
    /// # Arguments
    /// * `sample_index` - The index of the factor graph in the features.
    /// * `label` - The state assignment to evaluate.
    ///
    /// # Returns
    /// A vector of length `total_dimension`, or an error if a factor's type is unknown,
    /// its variables don't match the type's cardinalities or its data doesn't fit the
    /// type's weight block.
    pub fn joint_feature_vector(
        &self,
        sample_index: usize,
        label: &FactorGraphObservation,
    ) -> Result<Vec<f64>> {
        let graph = self.features.sample(sample_index)?;
        let states = label.states();
        graph.check_states(states)?;

        let mut psi = vec![0.0; self.total_dimension()];
        let mut mappings: HashMap<FactorTypeId, Vec<usize>> = HashMap::new();

        for factor in graph.factors() {
            let id = factor.type_id();
            let ftype = self
                .registry
                .get(id)
                .ok_or(ModelErr::UnknownFactorType { id })?;

            let w_map = mappings
                .entry(id)
                .or_insert_with(|| self.registry.params_mapping(id));

            assert_eq!(
                w_map.len(),
                ftype.w_dim(),
                "factor type {id} owns {} global slots but has w_dim {}",
                w_map.len(),
                ftype.w_dim()
            );

            graph.check_factor(factor, ftype)?;
            factor.check_layout(ftype)?;

            let dat = factor.data();
            let d = dat.len();
            let ei = ftype.index_from_universe_assignment(states, factor.variables());

            for (di, &x) in dat.iter().enumerate() {
                psi[w_map[ei * d + di]] += x;
            }
        }

        // -E(x, y) = <w, psi(x, y)>
        psi.iter_mut().for_each(|p| *p = -*p);

        Ok(psi)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::ModelConfig,
        dataset::{FactorGraphFeatures, FactorGraphLabels},
        factor::{Factor, TableFactorType},
        graph::FactorGraph,
        model::{tests::two_node_model, FactorGraphModel},
        observation::FactorGraphObservation,
        ModelErr,
    };

    fn single_factor_model(data: f64) -> FactorGraphModel {
        let mut graph = FactorGraph::new(vec![1]);
        graph.add_factor(Factor::new(3, vec![0], vec![data])).unwrap();

        let mut model = FactorGraphModel::new(
            FactorGraphFeatures::new(vec![graph]),
            FactorGraphLabels::new(vec![FactorGraphObservation::from_states(vec![0])]),
            ModelConfig::default(),
        )
        .unwrap();

        model
            .add_factor_type(Box::new(TableFactorType::zeros(7, vec![2], 1)))
            .unwrap();
        model
            .add_factor_type(Box::new(TableFactorType::zeros(3, vec![1], 1)))
            .unwrap();
        model
    }

    #[test]
    fn single_factor_is_negated_data() {
        let model = single_factor_model(2.5);
        let label = model.labels().label(0).unwrap().clone();

        let psi = model.joint_feature_vector(0, &label).unwrap();
        assert_eq!(psi, vec![0.0, 0.0, -2.5]);
    }

    #[test]
    fn same_type_factors_accumulate() {
        let model = two_node_model(ModelConfig::default());
        let label = FactorGraphObservation::from_states(vec![1, 1]);

        let psi = model.joint_feature_vector(0, &label).unwrap();

        // both unaries in state 1 share slots 2..4, the pairwise (1, 1) sits at 4 + 3
        assert_eq!(psi, vec![0.0, 0.0, -0.5, -2.5, 0.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn inner_product_is_minus_energy() {
        let mut model = two_node_model(ModelConfig::default());
        let w = [0.3, -1.2, 0.7, 2.0, 0.0, 1.5, -0.5, 0.25];
        model.push_to_types(&w).unwrap();

        let graph = model.features.sample_mut(0).unwrap();
        graph.compute_energies(&model.registry).unwrap();

        for states in [[0, 0], [1, 0], [0, 1], [1, 1]] {
            let label = FactorGraphObservation::from_states(states.to_vec());
            let psi = model.joint_feature_vector(0, &label).unwrap();
            let dot: f64 = w.iter().zip(&psi).map(|(a, b)| a * b).sum();

            let energy = model
                .features
                .sample(0)
                .unwrap()
                .evaluate_energy(&model.registry, &states)
                .unwrap();
            assert!((dot + energy).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_data_that_doesnt_fit() {
        let mut graph = FactorGraph::new(vec![2]);
        graph.add_factor(Factor::new(0, vec![0], vec![1.0, 1.0, 1.0])).unwrap();

        let mut model = FactorGraphModel::new(
            FactorGraphFeatures::new(vec![graph]),
            FactorGraphLabels::new(vec![FactorGraphObservation::from_states(vec![0])]),
            ModelConfig::default(),
        )
        .unwrap();
        model
            .add_factor_type(Box::new(TableFactorType::zeros(0, vec![2], 2)))
            .unwrap();

        let label = FactorGraphObservation::from_states(vec![0]);
        let err = model.joint_feature_vector(0, &label).unwrap_err();
        assert!(matches!(err, ModelErr::FactorDataMismatch { id: 0, .. }));
    }

    fn model_with(cards: Vec<usize>, factor: Factor, ftype: TableFactorType) -> FactorGraphModel {
        let states = vec![0; cards.len()];
        let mut graph = FactorGraph::new(cards);
        graph.add_factor(factor).unwrap();

        let mut model = FactorGraphModel::new(
            FactorGraphFeatures::new(vec![graph]),
            FactorGraphLabels::new(vec![FactorGraphObservation::from_states(states)]),
            ModelConfig::default(),
        )
        .unwrap();
        model.add_factor_type(Box::new(ftype)).unwrap();
        model
    }

    #[test]
    fn rejects_factor_with_missing_variables() {
        let model = model_with(
            vec![2, 2],
            Factor::new(0, vec![1], vec![1.0]),
            TableFactorType::zeros(0, vec![2, 2], 1),
        );

        let label = FactorGraphObservation::from_states(vec![0, 1]);
        let err = model.joint_feature_vector(0, &label).unwrap_err();
        assert_eq!(
            err,
            ModelErr::SizeMismatch {
                what: "factor variables",
                got: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn rejects_variable_with_more_states_than_type() {
        let model = model_with(
            vec![3],
            Factor::new(0, vec![0], vec![1.0]),
            TableFactorType::zeros(0, vec![2], 1),
        );

        let label = FactorGraphObservation::from_states(vec![2]);
        let err = model.joint_feature_vector(0, &label).unwrap_err();
        assert_eq!(
            err,
            ModelErr::CardinalityMismatch {
                id: 0,
                variable: 0,
                got: 3,
                expected: 2
            }
        );
    }

    #[test]
    fn rejects_unregistered_type() {
        let mut model = two_node_model(ModelConfig::default());
        model.del_factor_type(1).unwrap();

        let label = FactorGraphObservation::from_states(vec![0, 0]);
        let err = model.joint_feature_vector(0, &label).unwrap_err();
        assert_eq!(err, ModelErr::UnknownFactorType { id: 1 });
    }
}
