use crate::core::{Instance, InstanceError, Task, Time};
use clap::Args;
use rand::Rng;

/// Shape of randomly generated instances.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct GenConfig {
    /// The number of tasks.
    pub tasks: usize,
    /// Tasks start in `[0, horizon)`.
    #[clap(long, default_value_t = 100)]
    pub horizon: Time,
    /// The maximum length of a task.
    #[clap(short, long, default_value_t = 20)]
    pub max_length: Time,
    /// The maximum weight of a task.
    #[clap(short = 'w', long, default_value_t = 100)]
    pub max_weight: u32,
    /// Number of group labels. With 0 no task is grouped.
    #[clap(short, long, default_value_t = 0)]
    pub groups: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            tasks: 10,
            horizon: 100,
            max_length: 20,
            max_weight: 100,
            groups: 0,
        }
    }
}

/// Generates a random instance with integral weights.
/// With groups, every task is labelled with one of `G0..G{groups}` or left ungrouped.
///
/// # Errors
/// - If a generated task is rejected by [`Instance::new`].
pub fn generate(config: &GenConfig, rng: &mut impl Rng) -> Result<Instance, InstanceError> {
    let horizon = config.horizon.max(1);
    let max_length = config.max_length.max(1);
    let max_weight = config.max_weight.max(1);

    let mut tasks = Vec::with_capacity(config.tasks);
    for id in 0..config.tasks {
        let start = rng.gen_range(0..horizon);
        let end = start + rng.gen_range(1..=max_length);
        let weight = f64::from(rng.gen_range(1..=max_weight));

        let mut task = Task::new(id, start, end, weight);
        if config.groups > 0 {
            let group = rng.gen_range(0..=config.groups);
            task.group = (group < config.groups).then(|| format!("G{group}"));
        }
        tasks.push(task);
    }

    Instance::new(tasks)
}
