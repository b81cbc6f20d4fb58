use super::relaxation::{Relaxation, Relaxed};
use crate::core::{ConflictMatrix, Instance, Limit, Selection, SolveError, Solver};
use log::{debug, trace, warn};

/// Default distance from 0 or 1 under which a relaxed variable counts as integral.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Counters collected during one branch-and-bound solve.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BranchStats {
    /// Relaxations solved.
    pub nodes: usize,
    /// Nodes whose relaxation was infeasible.
    pub infeasible: usize,
    /// Nodes cut off by the incumbent.
    pub pruned: usize,
    /// Incumbent values in installation order.
    pub incumbent_history: Vec<f64>,
}

/// An integral solution found at a node.
#[derive(Clone, Debug, PartialEq)]
struct Candidate {
    x: Vec<f64>,
    value: f64,
    depth: usize,
}

/// Best integral solution found so far. Only strictly better solutions replace it.
#[derive(Clone, Debug)]
struct Incumbent {
    value: f64,
    depth: usize,
}

impl Incumbent {
    const fn new() -> Self {
        Self {
            value: f64::NEG_INFINITY,
            depth: 0,
        }
    }

    fn try_install(&mut self, candidate: &Candidate) -> bool {
        if candidate.value > self.value {
            self.value = candidate.value;
            self.depth = candidate.depth;
            true
        } else {
            false
        }
    }
}

/// Recursive search over variable bounds. The incumbent lives here, so each solve
/// starts from a fresh one.
struct Search<'a> {
    relaxation: Relaxation<'a>,
    weights: &'a [f64],
    tolerance: f64,
    limit: &'a Limit,
    incumbent: Incumbent,
    stats: BranchStats,
}

impl Search<'_> {
    fn branch(
        &mut self,
        lower: Vec<f64>,
        upper: Vec<f64>,
        depth: usize,
    ) -> Result<Option<Candidate>, SolveError> {
        self.limit.check()?;
        self.stats.nodes += 1;

        let Some(Relaxed { x, objective }) = self.relaxation.solve(&lower, &upper)? else {
            trace!("Node at depth {depth} is infeasible");
            self.stats.infeasible += 1;
            return Ok(None);
        };

        if objective < self.incumbent.value {
            trace!("Node at depth {depth} bounded by {objective}");
            self.stats.pruned += 1;
            return Ok(None);
        }

        let Some(i) = x.iter().position(|&value| !is_integral(value, self.tolerance)) else {
            let candidate = self.integral(&x, depth);
            if self.incumbent.try_install(&candidate) {
                debug!("New incumbent {} at depth {depth}", candidate.value);
                self.stats.incumbent_history.push(candidate.value);
            }
            return Ok(Some(candidate));
        };

        trace!("Branching on x[{i}] = {} at depth {depth}", x[i]);

        let mut left_upper = upper.clone();
        left_upper[i] = x[i].floor();
        let left = self.branch(lower.clone(), left_upper, depth + 1)?;

        let mut right_lower = lower;
        right_lower[i] = x[i].ceil();
        let right = self.branch(right_lower, upper, depth + 1)?;

        Ok(match (left, right) {
            (Some(left), Some(right)) => Some(if left.value > right.value { left } else { right }),
            (Some(candidate), None) | (None, Some(candidate)) => Some(candidate),
            (None, None) => None,
        })
    }

    /// Snaps an integral relaxation to exact 0/1 values and recomputes its weight.
    fn integral(&self, x: &[f64], depth: usize) -> Candidate {
        let x: Vec<f64> = x.iter().map(|value| value.round()).collect();
        let value: f64 = self
            .weights
            .iter()
            .zip(&x)
            .filter(|&(_, &chosen)| chosen >= 1.0)
            .map(|(weight, _)| weight)
            .sum();
        Candidate { x, value, depth }
    }
}

fn is_integral(value: f64, tolerance: f64) -> bool {
    (value - value.round()).abs() <= tolerance
}

/// Branch-and-bound over the 0/1 program `max w'x s.t. x_i + x_j <= 1` for every
/// conflicting pair.
///
/// Each node solves the continuous relaxation within its variable bounds. Nodes whose
/// relaxation is infeasible or cannot reach the incumbent are cut. Otherwise the first
/// fractional variable is branched on, the rounded-down side first. Handles both
/// time overlaps and group constraints.
#[derive(Clone, Debug)]
pub struct BranchAndBound {
    tolerance: f64,
    limit: Limit,
    stats: BranchStats,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            tolerance: INTEGRALITY_TOLERANCE,
            limit: Limit::default(),
            stats: BranchStats::default(),
        }
    }
}

impl BranchAndBound {
    /// Creates a new solver with the given integrality tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Sets the cooperative search limit.
    #[must_use]
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the counters of the last solve.
    #[must_use]
    pub const fn stats(&self) -> &BranchStats {
        &self.stats
    }
}

impl Solver for BranchAndBound {
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Selection<'a>, SolveError> {
        self.limit.start();
        self.stats = BranchStats::default();

        if instance.is_empty() {
            return Ok(Selection::new(instance).at_depth(1));
        }

        let n = instance.len();
        let weights: Vec<f64> = instance.tasks().iter().map(|task| task.weight).collect();
        let matrix = ConflictMatrix::new(instance.graph(), n);

        let mut search = Search {
            relaxation: Relaxation::new(&weights, &matrix),
            weights: &weights,
            tolerance: self.tolerance,
            limit: &self.limit,
            incumbent: Incumbent::new(),
            stats: BranchStats::default(),
        };

        let result = search.branch(vec![0.0; n], vec![1.0; n], 1);
        self.stats = search.stats;
        let nodes = self.stats.nodes;
        let result = result.inspect_err(|err| warn!("Branch-and-bound stopped after {nodes} nodes: {err}"));
        let Some(best) = result? else {
            return Err(SolveError::Infeasible);
        };

        debug_assert!(
            best.value >= search.incumbent.value,
            "Search returned a worse solution than its incumbent"
        );
        debug!(
            "Branch-and-bound solved {n} tasks with value {} after {nodes} nodes, incumbent settled at depth {}",
            best.value, search.incumbent.depth
        );

        let selected = best
            .x
            .iter()
            .enumerate()
            .filter(|&(_, &chosen)| chosen >= 1.0)
            .map(|(index, _)| index)
            .collect();

        Ok(Selection::with_value(instance, selected, best.value).at_depth(best.depth))
    }

    fn set_limit(&mut self, limit: Limit) {
        self.limit = limit;
    }

    fn supports_groups(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "BranchAndBound"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(BranchAndBound::default());

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::samples;
    use std::time::Duration;

    fn instance(start: &[i64], end: &[i64], weight: &[f64]) -> Instance {
        Instance::from_columns(start, end, weight).unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn test_branch_and_bound() {
        assert!(samples(true, &mut BranchAndBound::default()).is_ok());
    }

    #[test]
    fn known_optima() -> anyhow::Result<()> {
        let cases = [
            (instance(&[1, 2, 3, 4, 6], &[3, 5, 10, 6, 9], &[20.0, 20.0, 100.0, 70.0, 60.0]), 150.0),
            (instance(&[1, 2, 3, 3], &[3, 4, 5, 6], &[50.0, 10.0, 40.0, 70.0]), 120.0),
            (instance(&[1, 1, 1], &[2, 3, 4], &[5.0, 6.0, 4.0]), 6.0),
        ];

        for (instance, expected) in &cases {
            let selection = BranchAndBound::default().solve(instance)?;
            assert!(selection.verify());
            assert!((selection.value() - expected).abs() < f64::EPSILON);
            assert!(selection.depth().is_some_and(|depth| depth >= 1));
        }

        Ok(())
    }

    #[test]
    fn fractional_root_branches() -> anyhow::Result<()> {
        let instance = instance(&[1, 1, 1], &[2, 3, 4], &[5.0, 6.0, 4.0]);
        let mut solver = BranchAndBound::default();
        let selection = solver.solve(&instance)?;

        assert_eq!(selection.ids(), vec![1]);
        assert!(selection.depth().is_some_and(|depth| depth > 1));
        assert!(solver.stats().nodes > 1);
        Ok(())
    }

    #[test]
    fn incumbent_never_regresses() -> anyhow::Result<()> {
        let instance = instance(
            &[0, 1, 2, 3, 4, 5, 6, 7],
            &[3, 4, 5, 6, 7, 8, 9, 10],
            &[3.0, 5.0, 4.0, 6.0, 2.0, 7.0, 1.0, 5.0],
        );
        let mut solver = BranchAndBound::default();
        let selection = solver.solve(&instance)?;
        let history = &solver.stats().incumbent_history;

        assert!(!history.is_empty());
        assert!(history.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(history.last().is_some_and(|&last| (last - selection.value()).abs() < f64::EPSILON));
        Ok(())
    }

    #[test]
    fn groups_limit_choice_to_one_task() -> anyhow::Result<()> {
        let instance = instance(&[0, 2, 4, 6], &[1, 3, 5, 7], &[5.0, 3.0, 4.0, 6.0]).with_groups(vec![
            Some("A".into()),
            Some("A".into()),
            Some("B".into()),
            None,
        ])?;

        let selection = BranchAndBound::default().solve(&instance)?;
        let mut ids = selection.ids();
        ids.sort_unstable();

        assert!(selection.verify());
        assert!((selection.value() - 15.0).abs() < f64::EPSILON);
        assert_eq!(ids, vec![0, 2, 3]);
        Ok(())
    }

    #[test]
    fn empty_instance() -> anyhow::Result<()> {
        let instance = instance(&[], &[], &[]);
        let selection = BranchAndBound::default().solve(&instance)?;
        assert!(selection.tasks().is_empty());
        assert!(selection.value().abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn zero_time_limit_interrupts() {
        let instance = instance(&[0, 1], &[2, 3], &[1.0, 1.0]);
        let mut solver = BranchAndBound::default().with_limit(Limit::with_time_limit(Duration::ZERO));
        assert!(matches!(
            solver.solve(&instance),
            Err(SolveError::Interrupted { .. })
        ));
    }

    #[test]
    fn integrality_uses_tolerance() {
        assert!(is_integral(0.999_999_9, INTEGRALITY_TOLERANCE));
        assert!(is_integral(1e-9, INTEGRALITY_TOLERANCE));
        assert!(!is_integral(0.5, INTEGRALITY_TOLERANCE));
        assert!(!is_integral(0.999, INTEGRALITY_TOLERANCE));
    }

    #[test]
    fn incumbent_keeps_first_of_equal_values() {
        let mut incumbent = Incumbent::new();
        let first = Candidate {
            x: vec![1.0, 0.0],
            value: 2.0,
            depth: 2,
        };
        let tie = Candidate {
            x: vec![0.0, 1.0],
            value: 2.0,
            depth: 3,
        };

        assert!(incumbent.try_install(&first));
        assert!(!incumbent.try_install(&tie));
        assert!((incumbent.value - 2.0).abs() < f64::EPSILON);
        assert_eq!(incumbent.depth, 2);
    }
}
