use super::{total_weight, Instance};

/// Tolerance used when comparing a reported value with the recomputed weight sum.
pub const VALUE_TOLERANCE: f64 = 1e-6;

/// A set of selected tasks produced by a solver.
/// Tasks are stored by their index in the instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection<'a> {
    instance: &'a Instance,
    tasks: Vec<usize>,
    value: f64,
    depth: Option<usize>,
}

impl<'a> Selection<'a> {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            tasks: Vec::new(),
            value: 0.0,
            depth: None,
        }
    }

    /// Creates a selection with the reported optimal value.
    #[must_use]
    pub const fn with_value(instance: &'a Instance, tasks: Vec<usize>, value: f64) -> Self {
        Self {
            instance,
            tasks,
            value,
            depth: None,
        }
    }

    /// Attaches the search depth at which the selection was found.
    #[must_use]
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Returns the instance the selection belongs to.
    #[must_use]
    pub const fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Returns the indices of the selected tasks.
    #[must_use]
    pub fn tasks(&self) -> &[usize] {
        &self.tasks
    }

    /// Returns the ids of the selected tasks in selection order.
    #[must_use]
    pub fn ids(&self) -> Vec<usize> {
        let tasks = self.instance.tasks();
        self.tasks.iter().map(|&index| tasks[index].id).collect()
    }

    /// Returns the value reported by the solver.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the search depth, if the solver reports one.
    #[must_use]
    pub const fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Recomputes the total weight of the selected tasks.
    #[must_use]
    pub fn calculate_value(&self) -> f64 {
        total_weight(self.instance.tasks(), &self.tasks)
    }

    /// Checks that no two selected tasks conflict, no task is selected twice and
    /// the reported value matches the weight of the selected tasks.
    #[must_use]
    pub fn verify(&self) -> bool {
        let graph = self.instance.graph();

        for (position, &first) in self.tasks.iter().enumerate() {
            if first >= self.instance.len() {
                return false;
            }
            for &second in &self.tasks[position + 1..] {
                if first == second || graph.are_conflicted(first, second) {
                    return false;
                }
            }
        }

        (self.calculate_value() - self.value).abs() <= VALUE_TOLERANCE
    }
}
