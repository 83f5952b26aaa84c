use factor_graph_model::{
    dataset::{FactorGraphFeatures, FactorGraphLabels},
    factor::{Factor, TableFactorType},
    graph::FactorGraph,
    inference::InferenceMode,
    observation::FactorGraphObservation,
    FactorGraphModel, ModelConfig,
};
use ndarray::ArrayView1;

const TOL: f64 = 1e-10;

fn dot(a: &[f64], b: &[f64]) -> f64 {
    ArrayView1::from(a).dot(&ArrayView1::from(b))
}

/// Two binary nodes joined by one edge, with two unary types and one pairwise type.
fn two_node_tree(mode: InferenceMode) -> FactorGraphModel {
    let mut graph = FactorGraph::new(vec![2, 2]);
    graph.add_factor(Factor::new(0, vec![0], vec![0.7, -1.2])).unwrap();
    graph.add_factor(Factor::new(1, vec![1], vec![1.5])).unwrap();
    graph.add_factor(Factor::new(2, vec![0, 1], vec![1.0])).unwrap();

    let truth = FactorGraphObservation::new(vec![0, 1], vec![1.0, 0.5]).unwrap();
    let mut model = FactorGraphModel::new(
        FactorGraphFeatures::new(vec![graph]),
        FactorGraphLabels::new(vec![truth]),
        ModelConfig::new(mode, true),
    )
    .unwrap();

    model
        .add_factor_type(Box::new(TableFactorType::zeros(0, vec![2], 2)))
        .unwrap();
    model
        .add_factor_type(Box::new(TableFactorType::zeros(1, vec![2], 1)))
        .unwrap();
    model
        .add_factor_type(Box::new(TableFactorType::zeros(2, vec![2, 2], 1)))
        .unwrap();
    model
}

const W: [f64; 10] = [0.4, -0.3, 1.1, 0.2, -0.8, 0.9, 0.0, 1.3, 0.6, -0.1];

#[test]
fn score_decomposes_into_energies() {
    let mut model = two_node_tree(InferenceMode::TreeMaxProd);
    assert_eq!(model.total_dimension(), W.len());

    let ret = model.argmax(&W, 0, false).unwrap();
    let energy_gt = -dot(&W, &ret.psi_truth);
    let energy_pred = -dot(&W, &ret.psi_pred);

    assert!((ret.score - (energy_gt - energy_pred)).abs() < TOL);
    // without loss augmentation the prediction is the MAP, the truth can't beat it
    assert!(ret.score >= -TOL);
    assert!((ret.slack(&W) - (ret.delta + ret.score)).abs() < TOL);
}

#[test]
fn prediction_is_the_minimum_energy_state() {
    let mut model = two_node_tree(InferenceMode::TreeMaxProd);
    let ret = model.argmax(&W, 0, false).unwrap();
    let energy_pred = -dot(&W, &ret.psi_pred);

    for states in [[0, 0], [1, 0], [0, 1], [1, 1]] {
        let label = FactorGraphObservation::from_states(states.to_vec());
        let psi = model.joint_feature_vector(0, &label).unwrap();
        assert!(energy_pred <= -dot(&W, &psi) + TOL);
    }
}

#[test]
fn training_maximizes_margin_violation() {
    let mut model = two_node_tree(InferenceMode::LoopyMaxProd);
    let truth = model.labels().label(0).unwrap().clone();
    let ret = model.argmax(&W, 0, true).unwrap();

    // the loss augmented prediction maximizes delta - E(y) over every label
    let objective = |psi: &[f64], delta: f64| delta + dot(&W, psi);
    let best = objective(&ret.psi_pred, ret.delta);

    for states in [[0, 0], [1, 0], [0, 1], [1, 1]] {
        let label = FactorGraphObservation::from_states(states.to_vec());
        let psi = model.joint_feature_vector(0, &label).unwrap();
        let delta = model.delta_loss(&truth, &label).unwrap();
        assert!(objective(&psi, delta) <= best + TOL);
    }

    let energy_gt = -dot(&W, &ret.psi_truth);
    let energy_pred = -dot(&W, &ret.psi_pred);
    assert!((ret.score - (energy_gt - energy_pred)).abs() < TOL);
    assert!(ret.slack(&W) >= -TOL);
}

#[test]
fn oracle_pushes_weights_into_types() {
    let mut model = two_node_tree(InferenceMode::TreeMaxProd);
    model.argmax(&W, 0, false).unwrap();

    assert_eq!(model.w_cache(), &W);
    assert_eq!(model.factor_type(0).unwrap().w(), &W[0..4]);
    assert_eq!(model.factor_type(1).unwrap().w(), &W[4..6]);
    assert_eq!(model.factor_type(2).unwrap().w(), &W[6..10]);
    assert_eq!(model.pull_from_types(), W.to_vec());
}

#[test]
fn graph_cut_constraints_cover_the_pairwise_type() {
    let model = two_node_tree(InferenceMode::GraphCut);
    let constraints = model.build_constraints(2.0).unwrap();
    let lb = constraints.lower_bound.unwrap();
    let ub = constraints.upper_bound.unwrap();

    assert_eq!(model.params_mapping(2), vec![6, 7, 8, 9]);
    assert_eq!(lb.to_vec()[6..], [0.0, 0.0, 0.0, 0.0]);
    assert_eq!(ub.to_vec()[6..], [0.0, f64::INFINITY, f64::INFINITY, 0.0]);
    assert!(lb.iter().take(6).all(|&b| b == f64::NEG_INFINITY));
}
