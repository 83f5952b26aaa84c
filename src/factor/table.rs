use serde::{Deserialize, Serialize};

use super::{FactorType, FactorTypeId};
use crate::{ModelErr, Result};

/// A factor type whose energies are a dense table over every joint assignment.
///
/// Each assignment owns `data_size` consecutive weights, so the energy of assignment
/// `a` for a factor with data `x` is `w[a * data_size..][..data_size] · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableTypeSpec")]
pub struct TableFactorType {
    id: FactorTypeId,
    cardinalities: Vec<usize>,
    data_size: usize,
    w: Vec<f64>,
}

#[derive(Deserialize)]
struct TableTypeSpec {
    id: FactorTypeId,
    cardinalities: Vec<usize>,
    data_size: usize,
    w: Option<Vec<f64>>,
}

impl TryFrom<TableTypeSpec> for TableFactorType {
    type Error = ModelErr;

    fn try_from(spec: TableTypeSpec) -> Result<Self> {
        match spec.w {
            Some(w) => Self::new(spec.id, spec.cardinalities, spec.data_size, w),
            None => Ok(Self::zeros(spec.id, spec.cardinalities, spec.data_size)),
        }
    }
}

impl TableFactorType {
    /// Creates a new `TableFactorType`.
    ///
    /// # Arguments
    /// * `id` - The unique type id.
    /// * `cardinalities` - The number of states of each variable the type touches.
    /// * `data_size` - The length of the data vector of every factor of this type.
    /// * `w` - The initial weights, `data_size` per joint assignment.
    ///
    /// # Returns
    /// A new `TableFactorType` or an error if `w` doesn't have the expected length.
    pub fn new(
        id: FactorTypeId,
        cardinalities: Vec<usize>,
        data_size: usize,
        w: Vec<f64>,
    ) -> Result<Self> {
        let expected = data_size * cardinalities.iter().product::<usize>();
        if w.len() != expected {
            return Err(ModelErr::SizeMismatch {
                what: "factor type weights",
                got: w.len(),
                expected,
            });
        }

        Ok(Self {
            id,
            cardinalities,
            data_size,
            w,
        })
    }

    /// Creates a new `TableFactorType` with every weight set to zero.
    pub fn zeros(id: FactorTypeId, cardinalities: Vec<usize>, data_size: usize) -> Self {
        let w_dim = data_size * cardinalities.iter().product::<usize>();
        Self {
            id,
            cardinalities,
            data_size,
            w: vec![0.0; w_dim],
        }
    }

    /// Returns the expected data length of the factors of this type.
    pub fn data_size(&self) -> usize {
        self.data_size
    }
}

impl FactorType for TableFactorType {
    fn id(&self) -> FactorTypeId {
        self.id
    }

    fn w_dim(&self) -> usize {
        self.w.len()
    }

    fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    fn w(&self) -> &[f64] {
        &self.w
    }

    fn set_w(&mut self, w: Vec<f64>) -> Result<()> {
        if w.len() != self.w.len() {
            return Err(ModelErr::SizeMismatch {
                what: "factor type weights",
                got: w.len(),
                expected: self.w.len(),
            });
        }

        self.w = w;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn w_dim_is_data_size_times_assignments() {
        let ftype = TableFactorType::zeros(3, vec![2, 2], 3);

        assert_eq!(ftype.num_assignments(), 4);
        assert_eq!(ftype.w_dim(), 12);
        assert_eq!(ftype.data_size(), 3);
    }

    #[test]
    fn new_rejects_wrong_weight_length() {
        let res = TableFactorType::new(0, vec![2], 2, vec![1.0; 3]);
        assert!(matches!(
            res,
            Err(ModelErr::SizeMismatch {
                got: 3,
                expected: 4,
                ..
            })
        ));
    }

    #[test]
    fn deserialize_validates_weights() {
        let ftype: TableFactorType =
            serde_json::from_str(r#"{"id": 2, "cardinalities": [2, 2], "data_size": 1}"#).unwrap();
        assert_eq!(ftype, TableFactorType::zeros(2, vec![2, 2], 1));

        let res = serde_json::from_str::<TableFactorType>(
            r#"{"id": 2, "cardinalities": [2], "data_size": 1, "w": [1.0]}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn set_w_keeps_dimension() {
        let mut ftype = TableFactorType::zeros(0, vec![3], 1);

        assert!(ftype.set_w(vec![1.0, 2.0]).is_err());
        assert_eq!(ftype.w(), &[0.0; 3]);

        ftype.set_w(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ftype.w(), &[1.0, 2.0, 3.0]);
    }
}
