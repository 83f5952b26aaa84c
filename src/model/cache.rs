use log::debug;

use super::FactorGraphModel;
use crate::{initialization::WeightGen, ModelErr, Result};

impl FactorGraphModel {
    /// Returns the current global weight vector.
    pub fn w_cache(&self) -> &[f64] {
        &self.w_cache
    }

    /// Gathers every factor type's local weights into the global weight vector.
    ///
    /// # Returns
    /// A copy of the refreshed global weight vector.
    ///
    /// # Panics
    /// If a type's weight length doesn't match its mapping run.
    pub fn pull_from_types(&mut self) -> Vec<f64> {
        let dim = self.registry.total_dimension();
        if self.w_cache.len() != dim {
            self.w_cache.resize(dim, 0.0);
        }

        let mut offset = 0;
        for ftype in self.registry.iter() {
            let fw = ftype.w();
            let fw_map = self.registry.params_mapping(ftype.id());

            assert_eq!(
                fw_map.len(),
                fw.len(),
                "factor type {} has {} weights but owns {} global slots",
                ftype.id(),
                fw.len(),
                fw_map.len()
            );

            for (&pos, &wi) in fw_map.iter().zip(fw) {
                self.w_cache[pos] = wi;
            }
            offset += ftype.w_dim();
        }

        assert_eq!(
            offset,
            self.w_cache.len(),
            "factor types span {offset} weights but the cache holds {}",
            self.w_cache.len()
        );

        self.w_cache.clone()
    }

    /// Scatters a global weight vector back into every factor type's local weights.
    ///
    /// Pushing a vector identical to the current cache does nothing.
    ///
    /// # Arguments
    /// * `w` - The new global weight vector.
    ///
    /// # Returns
    /// Whether the factor types were updated, or an error if `w` has the wrong length
    /// or a type rejects its block. On a rejection the cache is pulled back from the
    /// types, so it never claims weights the types don't hold.
    pub fn push_to_types(&mut self, w: &[f64]) -> Result<bool> {
        if self.w_cache.as_slice() == w {
            return Ok(false);
        }

        if w.len() != self.w_cache.len() {
            return Err(ModelErr::SizeMismatch {
                what: "global weights",
                got: w.len(),
                expected: self.w_cache.len(),
            });
        }

        if self.config.verbose {
            debug!("update w_cache");
        }

        let blocks: Vec<Vec<f64>> = self
            .registry
            .iter()
            .map(|ftype| {
                let fw_map = self.registry.params_mapping(ftype.id());
                fw_map.iter().map(|&pos| w[pos]).collect()
            })
            .collect();

        let offset: usize = self.registry.iter().map(|ftype| ftype.w_dim()).sum();
        assert_eq!(
            offset,
            w.len(),
            "factor types span {offset} weights but the cache holds {}",
            w.len()
        );

        let res = self
            .registry
            .iter_mut()
            .zip(blocks)
            .try_for_each(|(ftype, fw)| ftype.set_w(fw));

        if let Err(e) = res {
            // the types that took their block keep it, the cache follows them
            self.pull_from_types();
            return Err(e);
        }

        self.w_cache = w.to_vec();
        Ok(true)
    }

    /// Fills every registered factor type's weights from a generator, in registration
    /// order, and refreshes the cache.
    ///
    /// # Returns
    /// An error if a generated block doesn't have its type's dimension, in which case
    /// no type is touched.
    pub fn init_weights(&mut self, weight_gen: &mut dyn WeightGen) -> Result<()> {
        let mut blocks = Vec::with_capacity(self.registry.len());
        for ftype in self.registry.iter() {
            let w = weight_gen.generate(ftype);
            if w.len() != ftype.w_dim() {
                return Err(ModelErr::SizeMismatch {
                    what: "generated weights",
                    got: w.len(),
                    expected: ftype.w_dim(),
                });
            }

            blocks.push(w);
        }

        let res = self
            .registry
            .iter_mut()
            .zip(blocks)
            .try_for_each(|(ftype, w)| ftype.set_w(w));

        self.pull_from_types();
        res
    }
}
