mod exhaustive;

pub use exhaustive::ExhaustiveInference;

use serde::{Deserialize, Serialize};

use crate::{graph::FactorGraph, registry::FactorTypeRegistry, Result};

/// The MAP inference algorithm the model is configured for.
///
/// The mode decides which graph shapes are accepted and which constraints the primal
/// solver receives, the actual minimization is delegated to a `MapInference` backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMode {
    #[default]
    TreeMaxProd,
    LoopyMaxProd,
    LpRelaxation,
    TrwsMaxProd,
    Gemplp,
    GraphCut,
}

impl InferenceMode {
    /// Returns whether this mode only accepts tree structured graphs.
    pub fn requires_tree(self) -> bool {
        matches!(self, InferenceMode::TreeMaxProd)
    }
}

/// A MAP inference backend.
pub trait MapInference {
    /// Finds a state assignment minimizing the graph's current energies.
    ///
    /// # Arguments
    /// * `graph` - A graph whose energy tables have been computed, and possibly loss augmented.
    /// * `registry` - The registered factor types of the graph's factors.
    ///
    /// # Returns
    /// One state per variable.
    fn infer(&self, graph: &FactorGraph, registry: &FactorTypeRegistry) -> Result<Vec<usize>>;
}
