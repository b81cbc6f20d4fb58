use crate::core::{Instance, Limit, Selection, SolveError, Solver, SortKey, Task, Time};
use log::{debug, trace, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A partial, conflict-free selection explored by the search.
/// Children copy the parent, so a span is never mutated once it is in the frontier.
#[derive(Clone, Debug, PartialEq)]
struct Span {
    start: Time,
    end: Time,
    weight: f64,
    selected: Vec<usize>,
}

impl Span {
    /// The empty selection. Its bounds are an empty hull, so every task can extend it.
    const fn root() -> Self {
        Self {
            start: Time::MAX,
            end: Time::MIN,
            weight: 0.0,
            selected: Vec::new(),
        }
    }

    fn accepts(&self, index: usize, task: &Task) -> bool {
        task.start >= self.end && !self.selected.contains(&index)
    }

    fn extend(&self, index: usize, task: &Task) -> Self {
        let mut selected = Vec::with_capacity(self.selected.len() + 1);
        selected.extend_from_slice(&self.selected);
        selected.push(index);

        Self {
            start: self.start.min(task.start),
            end: self.end.max(task.end),
            weight: self.weight + task.weight,
            selected,
        }
    }
}

/// Frontier entry. Ordered by weight, then by insertion so equal weights pop first-in first-out.
#[derive(Debug)]
struct Entry {
    sequence: u64,
    span: Span,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.span.weight.total_cmp(&other.span.weight) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            order => order,
        }
    }
}

/// Max-heap of spans. Owns the sequence counter used for tie-breaking.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<Entry>,
    sequence: u64,
}

impl Frontier {
    fn push(&mut self, span: Span) {
        self.heap.push(Entry {
            sequence: self.sequence,
            span,
        });
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<Span> {
        self.heap.pop().map(|entry| entry.span)
    }

    const fn pushed(&self) -> u64 {
        self.sequence
    }
}

/// Optimistic completion bound: the positive weight of every task starting at or after a time.
struct Completion {
    starts: Vec<Time>,
    suffix: Vec<f64>,
}

impl Completion {
    fn new(tasks: &[Task]) -> Self {
        let order = SortKey::Start.sorted_indices(tasks);
        let starts = order.iter().map(|&index| tasks[index].start).collect();
        let mut suffix = vec![0.0; order.len() + 1];
        for (position, &index) in order.iter().enumerate().rev() {
            suffix[position] = suffix[position + 1] + tasks[index].weight.max(0.0);
        }
        Self { starts, suffix }
    }

    fn after(&self, time: Time) -> f64 {
        self.suffix[self.starts.partition_point(|&start| start < time)]
    }
}

/// Best-first enumeration of conflict-free spans.
///
/// The frontier always expands the heaviest span first. A task extends a span only
/// if it starts at or after the span's end, so every selection is reached along a
/// single path. The enumeration is exhaustive and visits exponentially many spans
/// on instances with large independent sets. Enabling pruning drops spans whose
/// optimistic completion cannot beat the best value found so far.
#[derive(Clone, Debug, Default)]
pub struct BestFirst {
    order: SortKey,
    prune: bool,
    limit: Limit,
}

impl BestFirst {
    /// Creates a new exhaustive search visiting tasks in the given order.
    #[must_use]
    pub fn new(order: SortKey) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Enables or disables completion-bound pruning.
    #[must_use]
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Sets the cooperative search limit.
    #[must_use]
    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }

    fn search<'a>(&self, instance: &'a Instance) -> Result<Selection<'a>, SolveError> {
        let tasks = instance.tasks();
        let order = self.order.sorted_indices(tasks);
        let completion = self.prune.then(|| Completion::new(tasks));

        let mut frontier = Frontier::default();
        frontier.push(Span::root());

        let mut best_value = 0.0;
        let mut best = Vec::new();
        let mut expanded = 0_u64;

        while let Some(span) = frontier.pop() {
            self.limit.check()?;
            expanded += 1;
            trace!("Expanding span {:?} with weight {}", span.selected, span.weight);

            for &index in &order {
                let task = &tasks[index];
                if !span.accepts(index, task) {
                    continue;
                }

                let child = span.extend(index, task);
                if child.weight > best_value {
                    best_value = child.weight;
                    best.clone_from(&child.selected);
                }

                if let Some(completion) = &completion {
                    if child.weight + completion.after(child.end) <= best_value {
                        continue;
                    }
                }

                frontier.push(child);
            }
        }

        debug!(
            "Best-first expanded {expanded} of {} spans, best value {best_value}",
            frontier.pushed()
        );

        Ok(Selection::with_value(instance, best, best_value))
    }
}

impl Solver for BestFirst {
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Selection<'a>, SolveError> {
        if instance.has_groups() {
            return Err(SolveError::GroupsUnsupported {
                solver: "BestFirst",
            });
        }

        self.limit.start();
        self.search(instance)
            .inspect_err(|err| warn!("Best-first search stopped: {err}"))
    }

    fn set_limit(&mut self, limit: Limit) {
        self.limit = limit;
    }

    fn name(&self) -> &'static str {
        "BestFirst"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(BestFirst::default());

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::samples;
    use std::time::Duration;

    fn instance(start: &[i64], end: &[i64], weight: &[f64]) -> Instance {
        Instance::from_columns(start, end, weight).unwrap_or_else(|err| panic!("{err}"))
    }

    #[test]
    fn test_best_first() {
        assert!(samples(true, &mut BestFirst::default()).is_ok());
    }

    #[test]
    fn test_best_first_pruned() {
        assert!(samples(true, &mut BestFirst::default().with_pruning(true)).is_ok());
    }

    #[test]
    fn known_optima() -> anyhow::Result<()> {
        let cases = [
            (instance(&[1, 2, 3, 4, 6], &[3, 5, 10, 6, 9], &[20.0, 20.0, 100.0, 70.0, 60.0]), 150.0),
            (instance(&[1, 2, 3, 3], &[3, 4, 5, 6], &[50.0, 10.0, 40.0, 70.0]), 120.0),
            (instance(&[1, 1, 1], &[2, 3, 4], &[5.0, 6.0, 4.0]), 6.0),
        ];

        for order in [SortKey::Start, SortKey::End, SortKey::Weight] {
            for prune in [false, true] {
                for (instance, expected) in &cases {
                    let selection = BestFirst::new(order).with_pruning(prune).solve(instance)?;
                    assert!(selection.verify());
                    assert!((selection.value() - expected).abs() < f64::EPSILON);
                }
            }
        }

        Ok(())
    }

    #[test]
    fn first_span_reaching_maximum_is_kept() -> anyhow::Result<()> {
        // {0, 3} and {1, 2, 3} both weigh 5. The span holding task 0 is the
        // heaviest after the root, so it reaches 5 first and keeps its place.
        let instance = instance(&[0, 0, 1, 2], &[2, 1, 2, 3], &[4.0, 1.0, 3.0, 1.0]);
        let selection = BestFirst::default().solve(&instance)?;
        assert!((selection.value() - 5.0).abs() < f64::EPSILON);
        assert_eq!(selection.ids(), vec![0, 3]);
        Ok(())
    }

    #[test]
    fn empty_instance() -> anyhow::Result<()> {
        let instance = instance(&[], &[], &[]);
        let selection = BestFirst::default().solve(&instance)?;
        assert!(selection.tasks().is_empty());
        assert!(selection.value().abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn negative_times_are_reachable() -> anyhow::Result<()> {
        let instance = instance(&[-10, -5], &[-6, 0], &[1.0, 2.0]);
        let selection = BestFirst::default().solve(&instance)?;
        assert!((selection.value() - 3.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn groups_are_rejected() -> anyhow::Result<()> {
        let instance = instance(&[0], &[1], &[1.0]).with_groups(vec![Some("A".into())])?;
        assert!(matches!(
            BestFirst::default().solve(&instance),
            Err(SolveError::GroupsUnsupported { .. })
        ));
        Ok(())
    }

    #[test]
    fn zero_time_limit_interrupts() {
        let instance = instance(&[0, 1], &[1, 2], &[1.0, 1.0]);
        let mut solver = BestFirst::default().with_limit(Limit::with_time_limit(Duration::ZERO));
        assert!(matches!(
            solver.solve(&instance),
            Err(SolveError::Interrupted { .. })
        ));
    }

    #[test]
    fn frontier_pops_heaviest_then_oldest() {
        let mut frontier = Frontier::default();
        for (weight, marker) in [(1.0, 0), (3.0, 1), (3.0, 2), (2.0, 3)] {
            frontier.push(Span {
                start: 0,
                end: 0,
                weight,
                selected: vec![marker],
            });
        }

        let popped: Vec<_> = std::iter::from_fn(|| frontier.pop())
            .map(|span| span.selected[0])
            .collect();
        assert_eq!(popped, vec![1, 2, 3, 0]);
        assert_eq!(frontier.pushed(), 4);
    }

    #[test]
    fn completion_bound_counts_later_positive_weights() {
        let tasks = [
            Task::new(0, 0, 2, 5.0),
            Task::new(1, 2, 3, -1.0),
            Task::new(2, 4, 6, 2.0),
        ];
        let completion = Completion::new(&tasks);
        assert!((completion.after(Time::MIN) - 7.0).abs() < f64::EPSILON);
        assert!((completion.after(2) - 2.0).abs() < f64::EPSILON);
        assert!(completion.after(5).abs() < f64::EPSILON);
    }
}
