use serde::{Deserialize, Serialize};

use crate::{
    inference::InferenceMode,
    initialization::{ConstWeightGen, RandWeightGen, WeightGen},
    Result,
};

/// Immutable behaviour settings of a `FactorGraphModel`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub inference: InferenceMode,
    /// Emits oracle and mapping diagnostics through `log::debug!`, no effect on results.
    #[serde(default)]
    pub verbose: bool,
}

impl ModelConfig {
    /// Creates a new model configuration.
    ///
    /// # Arguments
    /// * `inference` - The configured MAP inference mode.
    /// * `verbose` - Whether to emit diagnostics.
    pub fn new(inference: InferenceMode, verbose: bool) -> Self {
        Self { inference, verbose }
    }
}

/// How to fill the factor types' weights before training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitConfig {
    Const {
        value: f64,
    },
    Uniform {
        low: f64,
        high: f64,
        seed: Option<u64>,
    },
    Normal {
        mean: f64,
        std_dev: f64,
        seed: Option<u64>,
    },
}

impl InitConfig {
    /// Builds the configured weight generator.
    ///
    /// # Returns
    /// The generator, or an error if the distribution parameters are invalid.
    pub fn build(self) -> Result<Box<dyn WeightGen>> {
        let weight_gen: Box<dyn WeightGen> = match self {
            InitConfig::Const { value } => Box::new(ConstWeightGen(value)),
            InitConfig::Uniform { low, high, seed } => {
                Box::new(RandWeightGen::uniform(low, high, seed)?)
            }
            InitConfig::Normal {
                mean,
                std_dev,
                seed,
            } => Box::new(RandWeightGen::normal(mean, std_dev, seed)?),
        };

        Ok(weight_gen)
    }
}
