#![allow(clippy::float_cmp)]
use super::ConflictGraph;

/// Dense constraint system `A x <= b` of the 0/1 selection program.
/// One row per conflicting pair, one column per task, two ones per row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConflictMatrix {
    columns: usize,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
}

impl ConflictMatrix {
    /// Builds the matrix for `columns` tasks from the pairs of the graph.
    #[must_use]
    pub fn new(graph: &ConflictGraph, columns: usize) -> Self {
        let a = graph
            .pairs()
            .iter()
            .map(|conflict| {
                let mut row = vec![0.0; columns];
                row[conflict.first()] = 1.0;
                row[conflict.second()] = 1.0;
                row
            })
            .collect::<Vec<_>>();
        let b = vec![1.0; a.len()];

        Self { columns, a, b }
    }

    /// Returns the number of constraint rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.a.len()
    }

    /// Returns the number of variables.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the coefficient matrix `A`.
    #[must_use]
    pub fn a(&self) -> &[Vec<f64>] {
        &self.a
    }

    /// Returns the right-hand side `b`.
    #[must_use]
    pub fn rhs(&self) -> &[f64] {
        &self.b
    }

    /// Returns the columns with a non-zero coefficient in the given row.
    pub fn row_support(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.a[row]
            .iter()
            .enumerate()
            .filter(|&(_, &coefficient)| coefficient != 0.0)
            .map(|(column, _)| column)
    }

    /// Returns whether `x` satisfies every row within `tolerance`.
    #[must_use]
    pub fn is_satisfied(&self, x: &[f64], tolerance: f64) -> bool {
        self.a.iter().zip(&self.b).all(|(row, &rhs)| {
            let lhs: f64 = row.iter().zip(x).map(|(a, x)| a * x).sum();
            lhs <= rhs + tolerance
        })
    }
}
