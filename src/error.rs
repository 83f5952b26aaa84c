use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::factor::FactorTypeId;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// The factor graph model's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelErr {
    ZeroDimFactorType {
        id: FactorTypeId,
    },
    UnknownFactorType {
        id: FactorTypeId,
    },
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    FactorDataMismatch {
        id: FactorTypeId,
        w_dim: usize,
        data_size: usize,
        num_assignments: usize,
    },
    CardinalityMismatch {
        id: FactorTypeId,
        variable: usize,
        got: usize,
        expected: usize,
    },
    VariableOutOfRange {
        variable: usize,
        num_vars: usize,
    },
    StateOutOfRange {
        variable: usize,
        state: usize,
        cardinality: usize,
    },
    SampleOutOfRange {
        index: usize,
        len: usize,
    },
    NotATree {
        index: usize,
    },
    EdgeFeaturesUnsupported {
        id: FactorTypeId,
        w_dim: usize,
    },
    UncoveredVariable {
        variable: usize,
    },
    InferenceBudgetExceeded {
        states: u128,
        budget: u128,
    },
    InvalidDistribution(String),
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::ZeroDimFactorType { id } => {
                write!(f, "factor type {id} has no parameters, w_dim can't be 0")
            }
            ModelErr::UnknownFactorType { id } => {
                write!(f, "factor type {id} is not registered")
            }
            ModelErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch on {what}: got {got}, expected {expected}"),
            ModelErr::FactorDataMismatch {
                id,
                w_dim,
                data_size,
                num_assignments,
            } => write!(
                f,
                "factor of type {id} doesn't fit its weight block: w_dim is {w_dim} but data size {data_size} times {num_assignments} assignments is {}",
                data_size * num_assignments
            ),
            ModelErr::CardinalityMismatch {
                id,
                variable,
                got,
                expected,
            } => write!(
                f,
                "variable {variable} has {got} states but factor type {id} expects {expected}"
            ),
            ModelErr::VariableOutOfRange { variable, num_vars } => write!(
                f,
                "variable {variable} is out of range, the graph has {num_vars} variables"
            ),
            ModelErr::StateOutOfRange {
                variable,
                state,
                cardinality,
            } => write!(
                f,
                "state {state} of variable {variable} is out of range, cardinality is {cardinality}"
            ),
            ModelErr::SampleOutOfRange { index, len } => {
                write!(f, "sample {index} is out of range, there are {len} samples")
            }
            ModelErr::NotATree { index } => write!(
                f,
                "sample {index} is not a tree graph but the inference mode requires one"
            ),
            ModelErr::EdgeFeaturesUnsupported { id, w_dim } => write!(
                f,
                "graph cut doesn't support edge features: pairwise binary factor type {id} has w_dim {w_dim}, expected 4"
            ),
            ModelErr::UncoveredVariable { variable } => {
                write!(f, "variable {variable} isn't touched by any factor")
            }
            ModelErr::InferenceBudgetExceeded { states, budget } => write!(
                f,
                "exhaustive inference over {states} joint states exceeds the budget of {budget}"
            ),
            ModelErr::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
        }
    }
}

impl Error for ModelErr {}
