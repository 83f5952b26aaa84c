use log::warn;

use crate::{
    factor::{FactorType, FactorTypeId},
    ModelErr, Result,
};

/// The ordered collection of registered factor types and the parameter mapping table.
///
/// The mapping table holds one type id per global weight slot. It is partitioned into
/// one contiguous run per registered type, in registration order, and it is rebuilt
/// in full on every structural change.
#[derive(Debug, Default)]
pub struct FactorTypeRegistry {
    types: Vec<Box<dyn FactorType>>,
    mapping: Vec<FactorTypeId>,
}

impl FactorTypeRegistry {
    /// Creates a new empty `FactorTypeRegistry`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new factor type and appends its run to the mapping table.
    ///
    /// Registering an id that is already present is tolerated: the call logs a warning
    /// and leaves the registry untouched.
    ///
    /// # Arguments
    /// * `ftype` - The factor type to register.
    ///
    /// # Returns
    /// Whether the type was added, or an error if it has no parameters.
    pub fn add(&mut self, ftype: Box<dyn FactorType>) -> Result<bool> {
        let id = ftype.id();
        if ftype.w_dim() == 0 {
            return Err(ModelErr::ZeroDimFactorType { id });
        }

        if self.contains(id) {
            warn!(id = id; "factor type has already been added");
            return Ok(false);
        }

        let old = self.mapping.clone();
        let mut mapping = vec![id; old.len() + ftype.w_dim()];
        mapping[..old.len()].copy_from_slice(&old);

        self.mapping = mapping;
        self.types.push(ftype);
        Ok(true)
    }

    /// Unregisters a factor type and compacts the mapping table.
    ///
    /// # Arguments
    /// * `id` - The id of the type to remove.
    ///
    /// # Returns
    /// The removed type or an error if no type with that id is registered.
    pub fn del(&mut self, id: FactorTypeId) -> Result<Box<dyn FactorType>> {
        let pos = self
            .types
            .iter()
            .position(|ftype| ftype.id() == id)
            .ok_or(ModelErr::UnknownFactorType { id })?;

        let ftype = self.types.remove(pos);
        let w_dim = ftype.w_dim();

        let old = self.mapping.clone();
        let mut mapping = vec![0; old.len() - w_dim];
        let mut ind = 0;

        for &mi in old.iter().filter(|&&mi| mi != id) {
            mapping[ind] = mi;
            ind += 1;
        }

        assert_eq!(
            ind,
            mapping.len(),
            "mapping table has {ind} entries after removing factor type {id}, expected {}",
            mapping.len()
        );

        self.mapping = mapping;
        Ok(ftype)
    }

    /// Returns the registered factor type with the given id.
    pub fn get(&self, id: FactorTypeId) -> Option<&dyn FactorType> {
        self.types
            .iter()
            .find(|ftype| ftype.id() == id)
            .map(|ftype| ftype.as_ref())
    }

    /// Returns the registered factor type with the given id, mutably.
    pub fn get_mut(&mut self, id: FactorTypeId) -> Option<&mut (dyn FactorType + 'static)> {
        self.types
            .iter_mut()
            .find(|ftype| ftype.id() == id)
            .map(|ftype| ftype.as_mut())
    }

    /// Returns whether a type with the given id is registered.
    pub fn contains(&self, id: FactorTypeId) -> bool {
        self.types.iter().any(|ftype| ftype.id() == id)
    }

    /// Iterates the registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn FactorType> {
        self.types.iter().map(|ftype| ftype.as_ref())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn FactorType>> {
        self.types.iter_mut()
    }

    /// Returns the amount of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the positions of the global weight vector owned by the type `id`.
    ///
    /// # Returns
    /// The ordered mapping positions, empty if the id is not registered.
    pub fn params_mapping(&self, id: FactorTypeId) -> Vec<usize> {
        self.mapping
            .iter()
            .enumerate()
            .filter(|&(_, &mi)| mi == id)
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns the whole mapping table.
    pub fn global_mapping(&self) -> &[FactorTypeId] {
        &self.mapping
    }

    /// Returns the length of the global weight vector.
    pub fn total_dimension(&self) -> usize {
        self.mapping.len()
    }
}
