use super::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Order in which a solver visits tasks.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub enum SortKey {
    /// Ascending start time.
    #[default]
    Start,
    /// Ascending end time.
    End,
    /// Ascending weight.
    Weight,
}

impl SortKey {
    /// Compares two tasks by this key.
    #[must_use]
    pub fn compare(self, first: &Task, second: &Task) -> Ordering {
        match self {
            Self::Start => first.start.cmp(&second.start),
            Self::End => first.end.cmp(&second.end),
            Self::Weight => first.weight.total_cmp(&second.weight),
        }
    }

    /// Returns the task indices sorted by this key.
    /// The sort is stable, so equal keys keep their input order.
    #[must_use]
    pub fn sorted_indices(self, tasks: &[Task]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&tasks[a], &tasks[b]));
        indices
    }
}

/// Sums the weights of the given tasks in index order.
#[must_use]
pub fn total_weight(tasks: &[Task], selected: &[usize]) -> f64 {
    selected.iter().map(|&index| tasks[index].weight).sum()
}
