#![allow(clippy::float_cmp)]
use crate::core::{Instance, Selection, SolveError, Solver, SortKey, Task};
use log::debug;

/// Exact dynamic program for instances whose only conflicts are time overlaps.
///
/// Tasks are visited by ascending start time. `best[i]` holds the largest weight
/// achievable with the tasks from position `i` onwards, so a task is either
/// skipped (`best[i + 1]`) or taken together with the best suffix starting at the
/// first task that begins at or after its end.
///
/// Runs in `O(n log n)`: the next compatible task is found by binary search over
/// the sorted start times.
#[derive(Clone, Debug, Default)]
pub struct DynamicProgramming;

impl Solver for DynamicProgramming {
    fn solve<'a>(&mut self, instance: &'a Instance) -> Result<Selection<'a>, SolveError> {
        if instance.has_groups() {
            return Err(SolveError::GroupsUnsupported {
                solver: "DynamicProgramming",
            });
        }

        let selection = dynamic_programming(instance);
        debug!(
            "DP solved {} tasks with value {}",
            instance.len(),
            selection.value()
        );
        Ok(selection)
    }

    fn name(&self) -> &'static str {
        "DynamicProgramming"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: fn() -> Box<dyn Solver> = || Box::new(DynamicProgramming);

fn dynamic_programming(instance: &Instance) -> Selection {
    if instance.is_empty() {
        return Selection::new(instance);
    }

    let order = SortKey::Start.sorted_indices(instance.tasks());
    let jobs: Vec<&Task> = order.iter().map(|&index| &instance.tasks()[index]).collect();
    let next: Vec<Option<usize>> = (0..jobs.len()).map(|i| next_available(&jobs, i)).collect();

    let n = jobs.len();
    let mut best = vec![0.0; n + 1];
    for i in (0..n).rev() {
        let take = jobs[i].weight + next[i].map_or(0.0, |j| best[j]);
        best[i] = best[i + 1].max(take);
    }

    let mut selected = Vec::new();
    let mut i = 0;
    while i < n {
        let take = jobs[i].weight + next[i].map_or(0.0, |j| best[j]);
        if best[i] == take {
            selected.push(order[i]);
            match next[i] {
                Some(j) => i = j,
                None => break,
            }
        } else {
            i += 1;
        }
    }

    Selection::with_value(instance, selected, best[0])
}

/// Returns the first position after `i` whose task starts at or after the end of task `i`.
/// `jobs` must be sorted by start time.
fn next_available(jobs: &[&Task], i: usize) -> Option<usize> {
    let end = jobs[i].end;
    let j = i + 1 + jobs[i + 1..].partition_point(|job| job.start < end);
    (j < jobs.len()).then_some(j)
}
