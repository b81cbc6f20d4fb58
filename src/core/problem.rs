use ahash::{HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Time ordinate of a task bound. Calendar labels are converted to it by `data::time`.
pub type Time = i64;

/// A task. Occupies the half-open interval `[start, end)` and contributes `weight` when selected.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Task {
    pub id: usize,
    pub start: Time,
    pub end: Time,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Task {
    /// Creates a new task without a group.
    #[must_use]
    pub const fn new(id: usize, start: Time, end: Time, weight: f64) -> Self {
        Self {
            id,
            start,
            end,
            weight,
            group: None,
        }
    }

    /// Returns whether the time intervals of two tasks overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    /// Returns whether two tasks belong to the same non-empty group.
    #[must_use]
    pub fn shares_group(&self, other: &Self) -> bool {
        matches!((&self.group, &other.group), (Some(a), Some(b)) if a == b)
    }

    /// Returns whether the tasks cannot be selected together.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.overlaps(other) || self.shares_group(other)
    }
}

/// Reasons an instance is rejected at construction.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InstanceError {
    #[error("input columns differ in length: {start} starts, {end} ends, {weight} weights")]
    LengthMismatch {
        start: usize,
        end: usize,
        weight: usize,
    },
    #[error("{groups} group labels given for {tasks} tasks")]
    GroupMismatch { groups: usize, tasks: usize },
    #[error("task {id} has start {start} not before end {end}")]
    MalformedInterval { id: usize, start: Time, end: Time },
    #[error("task id {0} appears more than once")]
    DuplicateId(usize),
    #[error("task {id} has non-finite weight {weight}")]
    InvalidWeight { id: usize, weight: f64 },
}

/// A conflict between two tasks described by their indices.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq, PartialOrd, Ord)]
pub struct Conflict(usize, usize);

impl Conflict {
    /// Creates a new conflict between two tasks. The smaller index is stored first.
    #[must_use]
    pub fn new(first: usize, second: usize) -> Self {
        Self(first.min(second), first.max(second))
    }

    /// Returns the smaller task index.
    #[must_use]
    pub const fn first(self) -> usize {
        self.0
    }

    /// Returns the larger task index.
    #[must_use]
    pub const fn second(self) -> usize {
        self.1
    }
}

/// A conflict graph. Contains an edge for every pair of tasks that conflict.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConflictGraph {
    edges: Vec<HashSet<usize>>,
    pairs: Vec<Conflict>,
}

impl ConflictGraph {
    /// Builds the graph by testing every unordered pair of tasks.
    /// Two tasks conflict when their intervals overlap or they share a group.
    #[must_use]
    pub fn build(tasks: &[Task]) -> Self {
        let mut edges = vec![HashSet::new(); tasks.len()];
        let mut pairs = Vec::new();

        for (first, task) in tasks.iter().enumerate() {
            for (second, other) in tasks.iter().enumerate().skip(first + 1) {
                if task.conflicts_with(other) {
                    edges[first].insert(second);
                    edges[second].insert(first);
                    pairs.push(Conflict(first, second));
                }
            }
        }

        Self { edges, pairs }
    }

    /// Returns whether the given tasks conflict.
    #[must_use]
    pub fn are_conflicted(&self, first: usize, second: usize) -> bool {
        self.edges
            .get(first)
            .is_some_and(|conflicts| conflicts.contains(&second))
    }

    /// Returns the conflicts of the given task.
    #[must_use]
    pub fn conflicts(&self, task: usize) -> &HashSet<usize> {
        static EMPTY: LazyLock<HashSet<usize>> = LazyLock::new(HashSet::new);

        self.edges.get(task).unwrap_or(&EMPTY)
    }

    /// Returns every conflicting pair `(i, j)` with `i < j`, in row-major order.
    #[must_use]
    pub fn pairs(&self) -> &[Conflict] {
        &self.pairs
    }

    /// Returns the number of conflicting pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns whether no two tasks conflict.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// An instance of the selection problem.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "Vec<Task>", into = "Vec<Task>")]
pub struct Instance {
    tasks: Vec<Task>,
    graph: ConflictGraph,
}

impl Instance {
    /// Creates a new instance from tasks and derives its conflict graph.
    ///
    /// # Errors
    /// - If a task interval is empty or reversed.
    /// - If a task id is repeated.
    /// - If a weight is not finite.
    pub fn new(tasks: Vec<Task>) -> Result<Self, InstanceError> {
        let mut ids = HashSet::with_capacity(tasks.len());

        for task in &tasks {
            if task.start >= task.end {
                return Err(InstanceError::MalformedInterval {
                    id: task.id,
                    start: task.start,
                    end: task.end,
                });
            }
            if !task.weight.is_finite() {
                return Err(InstanceError::InvalidWeight {
                    id: task.id,
                    weight: task.weight,
                });
            }
            if !ids.insert(task.id) {
                return Err(InstanceError::DuplicateId(task.id));
            }
        }

        let graph = ConflictGraph::build(&tasks);
        Ok(Self { tasks, graph })
    }

    /// Creates an instance from three equal-length columns. Task ids are the positions.
    ///
    /// # Errors
    /// - If the columns differ in length.
    /// - If any task is rejected by [`Instance::new`].
    pub fn from_columns(start: &[Time], end: &[Time], weight: &[f64]) -> Result<Self, InstanceError> {
        if start.len() != end.len() || start.len() != weight.len() {
            return Err(InstanceError::LengthMismatch {
                start: start.len(),
                end: end.len(),
                weight: weight.len(),
            });
        }

        let tasks = start
            .iter()
            .zip(end)
            .zip(weight)
            .enumerate()
            .map(|(id, ((&start, &end), &weight))| Task::new(id, start, end, weight))
            .collect();

        Self::new(tasks)
    }

    /// Attaches group labels to the tasks and rebuilds the conflict graph.
    ///
    /// # Errors
    /// - If the number of labels differs from the number of tasks.
    pub fn with_groups(mut self, groups: Vec<Option<String>>) -> Result<Self, InstanceError> {
        if groups.len() != self.tasks.len() {
            return Err(InstanceError::GroupMismatch {
                groups: groups.len(),
                tasks: self.tasks.len(),
            });
        }

        for (task, group) in self.tasks.iter_mut().zip(groups) {
            task.group = group;
        }
        self.graph = ConflictGraph::build(&self.tasks);

        Ok(self)
    }

    /// Returns the tasks in input order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the conflict graph.
    #[must_use]
    pub const fn graph(&self) -> &ConflictGraph {
        &self.graph
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the instance has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns whether any task carries a group label.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        self.tasks.iter().any(|task| task.group.is_some())
    }
}

impl TryFrom<Vec<Task>> for Instance {
    type Error = InstanceError;

    fn try_from(tasks: Vec<Task>) -> Result<Self, Self::Error> {
        Self::new(tasks)
    }
}

impl From<Instance> for Vec<Task> {
    fn from(instance: Instance) -> Self {
        instance.tasks
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instance_should_serialize() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[1, 2], &[3, 4], &[1.0, 2.0])?
            .with_groups(vec![Some("CS 101".into()), None])?;

        let serialized = crate::data::to_string(&instance)?;
        let mut reader = std::io::Cursor::new(serialized);
        let deserialized: Instance = crate::data::deserialize(&mut reader)?;

        assert_eq!(instance, deserialized);
        assert!(deserialized.graph().are_conflicted(0, 1));

        Ok(())
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let first = Task::new(0, 1, 3, 1.0);
        let second = Task::new(1, 3, 5, 1.0);
        let third = Task::new(2, 2, 4, 1.0);

        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
        assert!(first.overlaps(&third));
        assert!(third.overlaps(&second));
    }

    #[test]
    fn shared_group_conflicts_without_overlap() {
        let mut first = Task::new(0, 1, 2, 1.0);
        let mut second = Task::new(1, 5, 6, 1.0);
        assert!(!first.conflicts_with(&second));

        first.group = Some("A".into());
        second.group = Some("A".into());
        assert!(first.conflicts_with(&second));

        second.group = Some("B".into());
        assert!(!first.conflicts_with(&second));
    }

    #[test]
    fn graph_contains_every_overlapping_pair() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[1, 2, 3, 4, 6], &[3, 5, 10, 6, 9], &[1.0; 5])?;
        let graph = instance.graph();

        let pairs: Vec<_> = graph.pairs().iter().map(|c| (c.first(), c.second())).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (1, 3), (2, 3), (2, 4)]);
        assert!(graph.are_conflicted(3, 2));
        assert!(!graph.are_conflicted(0, 3));
        assert_eq!(graph.conflicts(2).len(), 3);
        assert!(graph.conflicts(42).is_empty());

        Ok(())
    }

    #[test]
    fn empty_instance_is_valid() -> anyhow::Result<()> {
        let instance = Instance::from_columns(&[], &[], &[])?;
        assert!(instance.is_empty());
        assert!(instance.graph().is_empty());
        Ok(())
    }

    #[test]
    fn construction_errors() {
        assert_eq!(
            Instance::from_columns(&[1, 2], &[3], &[1.0, 1.0]),
            Err(InstanceError::LengthMismatch {
                start: 2,
                end: 1,
                weight: 2
            })
        );
        assert_eq!(
            Instance::from_columns(&[3], &[3], &[1.0]),
            Err(InstanceError::MalformedInterval {
                id: 0,
                start: 3,
                end: 3
            })
        );
        assert_eq!(
            Instance::new(vec![Task::new(7, 0, 1, 1.0), Task::new(7, 2, 3, 1.0)]),
            Err(InstanceError::DuplicateId(7))
        );
        assert!(matches!(
            Instance::from_columns(&[0], &[1], &[f64::NAN]),
            Err(InstanceError::InvalidWeight { id: 0, .. })
        ));
        assert!(Instance::from_columns(&[0], &[1], &[1.0])
            .and_then(|instance| instance.with_groups(vec![]))
            .is_err());
    }

    #[test]
    fn malformed_json_is_rejected() {
        let json = r#"[{"id": 0, "start": 5, "end": 1, "weight": 1.0}]"#;
        let mut reader = std::io::Cursor::new(json);
        assert!(crate::data::deserialize::<Instance>(&mut reader).is_err());
    }
}
