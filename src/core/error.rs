use thiserror::Error;

/// Reasons a solver returns without a selection.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolveError {
    /// The solver only handles time-overlap conflicts.
    #[error("{solver} does not support group constraints")]
    GroupsUnsupported { solver: &'static str },
    /// The search limit was reached before the search finished.
    #[error("search interrupted: {reason}")]
    Interrupted { reason: &'static str },
    /// No integral assignment satisfies the constraints.
    #[error("no feasible selection exists")]
    Infeasible,
    /// The LP or ILP backend failed for a reason other than infeasibility.
    #[error("solver backend failed: {0}")]
    Backend(String),
}
