use crate::core::{ConflictMatrix, SolveError};
use good_lp::{
    constraint, default_solver, variable, variables, Expression, ResolutionError, Solution,
    SolverModel, Variable,
};

/// Optimum of a continuous relaxation.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Relaxed {
    pub x: Vec<f64>,
    pub objective: f64,
}

/// Continuous relaxation `max w'x s.t. Ax <= b, lower <= x <= upper` of the selection program.
/// The constraint rows are shared by every node; only the bounds change.
#[derive(Clone, Copy, Debug)]
pub(super) struct Relaxation<'a> {
    weights: &'a [f64],
    matrix: &'a ConflictMatrix,
}

impl<'a> Relaxation<'a> {
    pub const fn new(weights: &'a [f64], matrix: &'a ConflictMatrix) -> Self {
        Self { weights, matrix }
    }

    /// Solves the relaxation within the given variable bounds.
    /// Returns `None` if the bounds make it infeasible.
    pub fn solve(&self, lower: &[f64], upper: &[f64]) -> Result<Option<Relaxed>, SolveError> {
        if self.weights.is_empty() {
            return Ok(Some(Relaxed {
                x: Vec::new(),
                objective: 0.0,
            }));
        }

        let mut vars = variables!();
        let x: Vec<Variable> = lower
            .iter()
            .zip(upper)
            .map(|(&lb, &ub)| vars.add(variable().min(lb).max(ub)))
            .collect();

        let objective = self
            .weights
            .iter()
            .zip(&x)
            .fold(Expression::from(0.0), |acc, (&weight, &var)| acc + weight * var);

        let mut problem = vars.maximise(objective).using(default_solver);
        for (row, &rhs) in self.matrix.rhs().iter().enumerate() {
            let lhs = self
                .matrix
                .row_support(row)
                .fold(Expression::from(0.0), |acc, column| acc + x[column]);
            problem = problem.with(constraint!(lhs <= rhs));
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Ok(None),
            Err(err) => return Err(SolveError::Backend(err.to_string())),
        };

        let x: Vec<f64> = x.iter().map(|&var| solution.value(var)).collect();
        let objective: f64 = self.weights.iter().zip(&x).map(|(w, x)| w * x).sum();

        Ok(Some(Relaxed { x, objective }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Instance;

    const EPS: f64 = 1e-6;

    #[test]
    fn triangle_relaxation_is_fractional() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[1, 1, 1], &[2, 3, 4], &[5.0, 6.0, 4.0])?;
        let weights: Vec<f64> = instance.tasks().iter().map(|task| task.weight).collect();
        let matrix = ConflictMatrix::new(instance.graph(), instance.len());
        let relaxation = Relaxation::new(&weights, &matrix);

        let relaxed = relaxation
            .solve(&[0.0; 3], &[1.0; 3])?
            .ok_or_else(|| anyhow::anyhow!("root must be feasible"))?;

        assert!((relaxed.objective - 7.5).abs() < EPS);
        assert!(matrix.is_satisfied(&relaxed.x, EPS));
        Ok(())
    }

    #[test]
    fn conflicting_lower_bounds_are_infeasible() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[0, 1], &[2, 3], &[1.0, 1.0])?;
        let weights = [1.0, 1.0];
        let matrix = ConflictMatrix::new(instance.graph(), instance.len());
        let relaxation = Relaxation::new(&weights, &matrix);

        assert_eq!(relaxation.solve(&[1.0, 1.0], &[1.0, 1.0])?, None);
        Ok(())
    }

    #[test]
    fn bounds_fix_variables() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[0, 1], &[2, 3], &[3.0, 1.0])?;
        let weights = [3.0, 1.0];
        let matrix = ConflictMatrix::new(instance.graph(), instance.len());
        let relaxation = Relaxation::new(&weights, &matrix);

        let relaxed = relaxation
            .solve(&[0.0, 0.0], &[0.0, 1.0])?
            .ok_or_else(|| anyhow::anyhow!("bounded node must be feasible"))?;
        assert!(relaxed.x[0].abs() < EPS);
        assert!((relaxed.x[1] - 1.0).abs() < EPS);
        assert!((relaxed.objective - 1.0).abs() < EPS);
        Ok(())
    }
}
