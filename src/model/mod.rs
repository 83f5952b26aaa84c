mod cache;
mod oracle;
mod primal;
mod psi;

pub use oracle::ResultSet;
pub use primal::PrimalConstraints;

use log::debug;

use crate::{
    config::ModelConfig,
    dataset::{FactorGraphFeatures, FactorGraphLabels},
    factor::{FactorType, FactorTypeId},
    inference::{ExhaustiveInference, MapInference},
    registry::FactorTypeRegistry,
    ModelErr, Result,
};

/// A structured output model over factor graphs, trained with a margin rescaling
/// structured SVM.
///
/// The model owns the registered factor types and keeps one global weight vector in
/// sync with every type's local weights. Structural changes (`add_factor_type`,
/// `del_factor_type`) and weight pushes must not run concurrently with `argmax` or
/// `joint_feature_vector` on the same instance.
pub struct FactorGraphModel {
    config: ModelConfig,
    features: FactorGraphFeatures,
    labels: FactorGraphLabels,
    registry: FactorTypeRegistry,
    w_cache: Vec<f64>,
    inference: Box<dyn MapInference>,
}

impl FactorGraphModel {
    /// Creates a new `FactorGraphModel` with exhaustive MAP inference.
    ///
    /// # Arguments
    /// * `features` - One factor graph per sample.
    /// * `labels` - One ground truth observation per sample.
    /// * `config` - The inference mode and verbosity.
    ///
    /// # Returns
    /// A new model, or an error if features and labels differ in length.
    pub fn new(
        features: FactorGraphFeatures,
        labels: FactorGraphLabels,
        config: ModelConfig,
    ) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(ModelErr::SizeMismatch {
                what: "labels",
                got: labels.len(),
                expected: features.len(),
            });
        }

        Ok(Self {
            config,
            features,
            labels,
            registry: FactorTypeRegistry::new(),
            w_cache: Vec::new(),
            inference: Box::new(ExhaustiveInference::default()),
        })
    }

    /// Replaces the MAP inference backend.
    pub fn with_inference<I: MapInference + 'static>(mut self, inference: I) -> Self {
        self.inference = Box::new(inference);
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn features(&self) -> &FactorGraphFeatures {
        &self.features
    }

    pub fn labels(&self) -> &FactorGraphLabels {
        &self.labels
    }

    /// Registers a factor type and refreshes the weight cache.
    ///
    /// Registering an id twice is accepted as a no-op, only a warning is logged.
    ///
    /// # Returns
    /// An error if the type has no parameters.
    pub fn add_factor_type(&mut self, ftype: Box<dyn FactorType>) -> Result<()> {
        if self.registry.add(ftype)? {
            self.pull_from_types();

            if self.config.verbose {
                debug!("add_factor_type(): mapping = {:?}", self.registry.global_mapping());
            }
        }

        Ok(())
    }

    /// Unregisters a factor type and refreshes the weight cache.
    ///
    /// # Returns
    /// The removed type, or an error if no type with that id is registered.
    pub fn del_factor_type(&mut self, id: FactorTypeId) -> Result<Box<dyn FactorType>> {
        let ftype = self.registry.del(id)?;
        self.pull_from_types();

        if self.config.verbose {
            debug!("del_factor_type(): mapping = {:?}", self.registry.global_mapping());
        }

        Ok(ftype)
    }

    /// Returns the registered factor type with the given id.
    pub fn factor_type(&self, id: FactorTypeId) -> Option<&dyn FactorType> {
        self.registry.get(id)
    }

    /// Returns the registered factor type with the given id, mutably.
    ///
    /// Local weight changes made through it reach the cache on the next `pull_from_types`.
    pub fn factor_type_mut(&mut self, id: FactorTypeId) -> Option<&mut (dyn FactorType + 'static)> {
        self.registry.get_mut(id)
    }

    /// Iterates the registered factor types in registration order.
    pub fn factor_types(&self) -> impl Iterator<Item = &dyn FactorType> {
        self.registry.iter()
    }

    /// Returns the global weight positions owned by the factor type `id`.
    pub fn params_mapping(&self, id: FactorTypeId) -> Vec<usize> {
        self.registry.params_mapping(id)
    }

    /// Returns a copy of the whole parameter mapping table.
    pub fn global_mapping(&self) -> Vec<FactorTypeId> {
        self.registry.global_mapping().to_vec()
    }

    /// Returns the length of the global weight vector.
    pub fn total_dimension(&self) -> usize {
        self.registry.total_dimension()
    }

    /// Hook called by the solver before training starts, nothing to prepare.
    pub fn init_training(&mut self) {}
}
