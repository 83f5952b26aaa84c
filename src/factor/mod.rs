mod instance;
mod table;

pub use instance::Factor;
pub use table::TableFactorType;

use std::fmt::Debug;

/// The unique identifier of a registered factor type.
pub type FactorTypeId = u32;

/// A template for a class of potentials sharing one weight block.
///
/// The registry holds these as trait objects, everything the model needs from a
/// concrete template goes through this capability set.
pub trait FactorType: Debug {
    /// Returns the unique id of this type.
    fn id(&self) -> FactorTypeId;

    /// Returns the amount of weights this type owns.
    fn w_dim(&self) -> usize;

    /// Returns the number of states of each variable this type touches.
    fn cardinalities(&self) -> &[usize];

    /// Returns the current local weight vector.
    fn w(&self) -> &[f64];

    /// Replaces the local weight vector.
    ///
    /// # Arguments
    /// * `w` - The new weights, its length must equal `w_dim`.
    ///
    /// # Returns
    /// An error if the length of `w` doesn't match.
    fn set_w(&mut self, w: Vec<f64>) -> crate::Result<()>;

    /// Returns the number of joint assignments of this type's variables.
    fn num_assignments(&self) -> usize {
        self.cardinalities().iter().product()
    }

    /// Maps a full state vector, restricted to `vars`, into an assignment index.
    ///
    /// # Arguments
    /// * `states` - The state of every variable in the graph.
    /// * `vars` - The variables of the factor, in the type's order.
    ///
    /// # Returns
    /// An index in `[0, num_assignments)`.
    fn index_from_universe_assignment(&self, states: &[usize], vars: &[usize]) -> usize {
        let mut index = 0;
        let mut stride = 1;

        for (&var, &card) in vars.iter().zip(self.cardinalities()) {
            index += states[var] * stride;
            stride *= card;
        }

        index
    }

    /// Returns the state the `var_pos`-th variable takes in the assignment `index`.
    fn state_from_index(&self, index: usize, var_pos: usize) -> usize {
        let cards = self.cardinalities();
        let stride: usize = cards[..var_pos].iter().product();
        (index / stride) % cards[var_pos]
    }
}
