use super::MapInference;
use crate::{graph::FactorGraph, registry::FactorTypeRegistry, ModelErr, Result};

const DEFAULT_BUDGET: u128 = 1 << 20;

/// Exact inference by enumerating every joint state of the graph.
///
/// Only usable on small graphs, the amount of enumerated states is bounded by a budget.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveInference {
    budget: u128,
}

impl Default for ExhaustiveInference {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl ExhaustiveInference {
    /// Creates a new `ExhaustiveInference`.
    ///
    /// # Arguments
    /// * `budget` - The maximum amount of joint states to enumerate.
    pub fn new(budget: u128) -> Self {
        Self { budget }
    }
}

impl MapInference for ExhaustiveInference {
    fn infer(&self, graph: &FactorGraph, registry: &FactorTypeRegistry) -> Result<Vec<usize>> {
        let cards = graph.cardinalities();
        let states = cards
            .iter()
            .fold(1u128, |acc, &card| acc.saturating_mul(card as u128));

        if states > self.budget {
            return Err(ModelErr::InferenceBudgetExceeded {
                states,
                budget: self.budget,
            });
        }

        let mut curr = vec![0; cards.len()];
        let mut best = (curr.clone(), graph.evaluate_energy(registry, &curr)?);

        for _ in 1..states {
            // odometer step, first variable fastest
            for (state, &card) in curr.iter_mut().zip(cards) {
                *state += 1;
                if *state < card {
                    break;
                }
                *state = 0;
            }

            let energy = graph.evaluate_energy(registry, &curr)?;
            if energy < best.1 {
                best = (curr.clone(), energy);
            }
        }

        Ok(best.0)
    }
}
