mod error;
mod limit;
mod matrix;
mod problem;
mod selection;
mod util;

pub use error::*;
pub use limit::*;
pub use matrix::*;
pub use problem::*;
pub use selection::*;
pub use util::*;

/// Selects a conflict-free subset of the tasks of an instance.
pub trait Solver {
    /// Solves the given instance.
    ///
    /// # Errors
    /// - If the solver cannot handle the conflicts of the instance.
    /// - If the search limit of the solver is reached.
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Selection<'a>, SolveError>;

    /// Returns whether the solver honours group constraints.
    fn supports_groups(&self) -> bool {
        false
    }

    /// Replaces the search limit. Solvers without an incremental search ignore it.
    fn set_limit(&mut self, _limit: Limit) {}

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}
