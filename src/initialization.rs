use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

use crate::{factor::FactorType, ModelErr, Result};

/// Produces the initial weight block of each registered factor type.
pub trait WeightGen {
    /// Generates the starting weights of `ftype`.
    ///
    /// # Returns
    /// The block, expected to be `ftype.w_dim()` long.
    fn generate(&mut self, ftype: &dyn FactorType) -> Vec<f64>;
}

/// Starts every weight at the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstWeightGen(pub f64);

impl WeightGen for ConstWeightGen {
    fn generate(&mut self, ftype: &dyn FactorType) -> Vec<f64> {
        vec![self.0; ftype.w_dim()]
    }
}

/// Draws every weight independently from a distribution.
pub struct RandWeightGen<D: Distribution<f64>> {
    rng: StdRng,
    distribution: D,
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

impl RandWeightGen<Uniform<f64>> {
    /// Draws weights uniformly from `[low, high)`.
    ///
    /// # Arguments
    /// * `low` - The inclusive lower limit.
    /// * `high` - The exclusive upper limit.
    /// * `seed` - Fixes the draws when given, otherwise the os rng seeds them.
    ///
    /// # Returns
    /// An error if the range is empty or not finite.
    pub fn uniform(low: f64, high: f64, seed: Option<u64>) -> Result<Self> {
        let distribution =
            Uniform::new(low, high).map_err(|e| ModelErr::InvalidDistribution(e.to_string()))?;

        Ok(Self {
            rng: seeded(seed),
            distribution,
        })
    }
}

impl RandWeightGen<Normal<f64>> {
    /// Draws weights from `N(mean, std_dev²)`.
    ///
    /// # Returns
    /// An error if `std_dev` is negative or not finite.
    pub fn normal(mean: f64, std_dev: f64, seed: Option<u64>) -> Result<Self> {
        let distribution =
            Normal::new(mean, std_dev).map_err(|e| ModelErr::InvalidDistribution(e.to_string()))?;

        Ok(Self {
            rng: seeded(seed),
            distribution,
        })
    }
}

impl<D: Distribution<f64>> WeightGen for RandWeightGen<D> {
    fn generate(&mut self, ftype: &dyn FactorType) -> Vec<f64> {
        (&self.distribution)
            .sample_iter(&mut self.rng)
            .take(ftype.w_dim())
            .collect()
    }
}
