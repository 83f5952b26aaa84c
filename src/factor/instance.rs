use serde::{Deserialize, Serialize};

use super::{FactorType, FactorTypeId};
use crate::{ModelErr, Result};

/// A concrete application of a factor type to some variables of one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    type_id: FactorTypeId,
    variables: Vec<usize>,
    data: Vec<f64>,
    #[serde(skip)]
    energies: Vec<f64>,
}

impl Factor {
    /// Creates a new `Factor`.
    ///
    /// # Arguments
    /// * `type_id` - The id of the factor type this factor instantiates.
    /// * `variables` - The graph variables it touches, in the type's order.
    /// * `data` - The raw per-assignment data vector.
    pub fn new(type_id: FactorTypeId, variables: Vec<usize>, data: Vec<f64>) -> Self {
        Self {
            type_id,
            variables,
            data,
            energies: Vec::new(),
        }
    }

    pub fn type_id(&self) -> FactorTypeId {
        self.type_id
    }

    pub fn variables(&self) -> &[usize] {
        &self.variables
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the energy table, empty until `compute_energies` runs.
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub(crate) fn energies_mut(&mut self) -> &mut [f64] {
        &mut self.energies
    }

    /// Checks that this factor's data fits the weight block of `ftype`.
    pub(crate) fn check_layout(&self, ftype: &dyn FactorType) -> Result<()> {
        let num_assignments = ftype.num_assignments();
        if ftype.w_dim() != self.data.len() * num_assignments {
            return Err(ModelErr::FactorDataMismatch {
                id: ftype.id(),
                w_dim: ftype.w_dim(),
                data_size: self.data.len(),
                num_assignments,
            });
        }

        Ok(())
    }

    /// Recomputes the energy table from the weights of `ftype`.
    ///
    /// # Arguments
    /// * `ftype` - The registered type of this factor.
    ///
    /// # Returns
    /// An error if the data length doesn't fit the type's weight block.
    pub fn compute_energies(&mut self, ftype: &dyn FactorType) -> Result<()> {
        self.check_layout(ftype)?;

        let d = self.data.len();
        let w = ftype.w();

        self.energies = (0..ftype.num_assignments())
            .map(|ei| {
                w[ei * d..(ei + 1) * d]
                    .iter()
                    .zip(&self.data)
                    .map(|(wi, xi)| wi * xi)
                    .sum()
            })
            .collect();

        Ok(())
    }
}
