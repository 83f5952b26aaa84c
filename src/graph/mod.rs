mod disjoint_set;

use log::debug;
use serde::Deserialize;

use crate::{
    factor::{Factor, FactorType},
    observation::FactorGraphObservation,
    registry::FactorTypeRegistry,
    ModelErr, Result,
};
use disjoint_set::DisjointSet;

/// One structured sample: variables with their cardinalities and the factors over them.
///
/// Energies live in the factors and are only valid after `compute_energies`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "GraphSpec")]
pub struct FactorGraph {
    cardinalities: Vec<usize>,
    factors: Vec<Factor>,
    connectivity: Option<Connectivity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Connectivity {
    has_cycle: bool,
    num_edges: usize,
}

#[derive(Deserialize)]
struct GraphSpec {
    cardinalities: Vec<usize>,
    factors: Vec<Factor>,
}

impl TryFrom<GraphSpec> for FactorGraph {
    type Error = ModelErr;

    fn try_from(spec: GraphSpec) -> Result<Self> {
        let mut graph = Self::new(spec.cardinalities);
        for factor in spec.factors {
            graph.add_factor(factor)?;
        }

        Ok(graph)
    }
}

impl FactorGraph {
    /// Creates a new `FactorGraph` with no factors.
    ///
    /// # Arguments
    /// * `cardinalities` - The number of states of each variable.
    pub fn new(cardinalities: Vec<usize>) -> Self {
        Self {
            cardinalities,
            factors: Vec::new(),
            connectivity: None,
        }
    }

    /// Adds a factor, invalidating the connectivity computed so far.
    ///
    /// # Returns
    /// An error if the factor touches a variable the graph doesn't have.
    pub fn add_factor(&mut self, factor: Factor) -> Result<()> {
        let num_vars = self.num_vars();
        if let Some(&variable) = factor.variables().iter().find(|&&v| v >= num_vars) {
            return Err(ModelErr::VariableOutOfRange { variable, num_vars });
        }

        self.factors.push(factor);
        self.connectivity = None;
        Ok(())
    }

    pub fn num_vars(&self) -> usize {
        self.cardinalities.len()
    }

    pub fn cardinalities(&self) -> &[usize] {
        &self.cardinalities
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Links the variables of every factor into components, recording cycles.
    ///
    /// Repeated calls are no-ops until a factor is added.
    pub fn connect_components(&mut self) {
        if self.connectivity.is_some() {
            return;
        }

        let mut dset = DisjointSet::new(self.num_vars());
        let mut connectivity = Connectivity {
            has_cycle: false,
            num_edges: 0,
        };

        for factor in &self.factors {
            let vars = factor.variables();
            let Some((&first, rest)) = vars.split_first() else {
                continue;
            };

            for &var in rest {
                if dset.union(first, var) {
                    connectivity.num_edges += 1;
                } else {
                    connectivity.has_cycle = true;
                }
            }
        }

        debug!(
            sets = dset.num_sets(),
            edges = connectivity.num_edges,
            has_cycle = connectivity.has_cycle;
            "connected graph components"
        );
        self.connectivity = Some(connectivity);
    }

    /// Returns whether the graph is a single acyclic component.
    ///
    /// Connects components first if that hasn't happened yet.
    pub fn is_tree_graph(&mut self) -> bool {
        self.connect_components();

        match self.connectivity {
            Some(c) => !c.has_cycle && c.num_edges + 1 == self.num_vars(),
            None => false,
        }
    }

    /// Recomputes every factor's energy table from the registered weights.
    ///
    /// # Arguments
    /// * `registry` - The registered factor types.
    ///
    /// # Returns
    /// An error if a factor's type is unknown or doesn't fit the factor.
    pub fn compute_energies(&mut self, registry: &FactorTypeRegistry) -> Result<()> {
        for factor in &mut self.factors {
            let ftype = lookup(registry, factor)?;
            check_cardinalities(&self.cardinalities, factor, ftype)?;
            factor.compute_energies(ftype)?;
        }

        Ok(())
    }

    /// Subtracts each variable's loss weight from the energies of the states that
    /// disagree with the ground truth.
    ///
    /// The loss of a variable is applied once, in the first factor containing it.
    ///
    /// # Arguments
    /// * `registry` - The registered factor types.
    /// * `truth` - The ground truth observation.
    ///
    /// # Returns
    /// An error if the observation doesn't fit the graph or some variable isn't covered.
    pub fn loss_augmentation(
        &mut self,
        registry: &FactorTypeRegistry,
        truth: &FactorGraphObservation,
    ) -> Result<()> {
        let states = truth.states();
        let loss = truth.loss_weights();
        self.check_states(states)?;

        let mut covered = vec![false; self.num_vars()];

        for factor in &mut self.factors {
            let ftype = lookup(registry, factor)?;
            let vars = factor.variables().to_vec();
            let energies = factor.energies_mut();

            for (vi, &var) in vars.iter().enumerate() {
                if covered[var] {
                    continue;
                }

                for (ei, energy) in energies.iter_mut().enumerate() {
                    if ftype.state_from_index(ei, vi) != states[var] {
                        *energy -= loss[var];
                    }
                }

                covered[var] = true;
            }
        }

        match covered.iter().position(|&c| !c) {
            Some(variable) => Err(ModelErr::UncoveredVariable { variable }),
            None => Ok(()),
        }
    }

    /// Returns the total energy of the graph under `states`.
    ///
    /// # Arguments
    /// * `registry` - The registered factor types.
    /// * `states` - One state per variable.
    pub fn evaluate_energy(&self, registry: &FactorTypeRegistry, states: &[usize]) -> Result<f64> {
        self.check_states(states)?;

        self.factors.iter().try_fold(0.0, |acc, factor| {
            let ftype = lookup(registry, factor)?;
            let energies = factor.energies();
            if energies.len() != ftype.num_assignments() {
                return Err(ModelErr::SizeMismatch {
                    what: "factor energies",
                    got: energies.len(),
                    expected: ftype.num_assignments(),
                });
            }

            let ei = ftype.index_from_universe_assignment(states, factor.variables());
            Ok(acc + energies[ei])
        })
    }

    /// Returns the current energy table of every factor.
    pub fn energy_tables(&self) -> Vec<&[f64]> {
        self.factors.iter().map(Factor::energies).collect()
    }

    /// Checks that a factor's variables match its type's arity and cardinalities.
    pub(crate) fn check_factor(&self, factor: &Factor, ftype: &dyn FactorType) -> Result<()> {
        check_cardinalities(&self.cardinalities, factor, ftype)
    }

    pub(crate) fn check_states(&self, states: &[usize]) -> Result<()> {
        if states.len() != self.num_vars() {
            return Err(ModelErr::SizeMismatch {
                what: "states",
                got: states.len(),
                expected: self.num_vars(),
            });
        }

        for (variable, (&state, &cardinality)) in states.iter().zip(&self.cardinalities).enumerate() {
            if state >= cardinality {
                return Err(ModelErr::StateOutOfRange {
                    variable,
                    state,
                    cardinality,
                });
            }
        }

        Ok(())
    }
}

fn lookup<'r>(registry: &'r FactorTypeRegistry, factor: &Factor) -> Result<&'r dyn FactorType> {
    let id = factor.type_id();
    registry.get(id).ok_or(ModelErr::UnknownFactorType { id })
}

fn check_cardinalities(cards: &[usize], factor: &Factor, ftype: &dyn FactorType) -> Result<()> {
    let vars = factor.variables();
    if vars.len() != ftype.cardinalities().len() {
        return Err(ModelErr::SizeMismatch {
            what: "factor variables",
            got: vars.len(),
            expected: ftype.cardinalities().len(),
        });
    }

    for (&variable, &expected) in vars.iter().zip(ftype.cardinalities()) {
        if cards[variable] != expected {
            return Err(ModelErr::CardinalityMismatch {
                id: ftype.id(),
                variable,
                got: cards[variable],
                expected,
            });
        }
    }

    Ok(())
}
