mod best_first;
mod branch_and_bound;
mod dp;
#[cfg(feature = "gurobi")]
mod gurobi;
mod relaxation;

use crate::core::Solver;

pub use best_first::BestFirst;
pub use branch_and_bound::{BranchAndBound, BranchStats, INTEGRALITY_TOLERANCE};
pub use dp::DynamicProgramming;
#[cfg(feature = "gurobi")]
pub use gurobi::Gurobi;

/// Constructors of every registered solver.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SOLVERS: [fn() -> Box<dyn Solver>];
