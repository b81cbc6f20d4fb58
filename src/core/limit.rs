use super::SolveError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative stop condition polled by the searches at every step.
///
/// A limit combines an optional wall-clock budget with an interrupt flag that
/// can be raised from another thread. The budget starts counting at
/// [`Limit::start`], which every solver calls when a solve begins.
#[derive(Clone, Debug, Default)]
pub struct Limit {
    time_limit: Option<Duration>,
    deadline: Option<Instant>,
    interrupt: Arc<AtomicBool>,
}

impl Limit {
    /// Creates a limit that never trips on its own.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a limit with a wall-clock budget.
    #[must_use]
    pub fn with_time_limit(time_limit: Duration) -> Self {
        Self {
            time_limit: Some(time_limit),
            ..Self::default()
        }
    }

    /// Returns a handle that interrupts every search using this limit when set.
    #[must_use]
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Restarts the wall-clock budget.
    pub fn start(&mut self) {
        self.deadline = self.time_limit.map(|limit| Instant::now() + limit);
    }

    /// Returns an error if the search must stop.
    ///
    /// # Errors
    /// - If the interrupt flag is set.
    /// - If the deadline has passed.
    pub fn check(&self) -> Result<(), SolveError> {
        if self.interrupt.load(Ordering::Relaxed) {
            return Err(SolveError::Interrupted {
                reason: "interrupt signal received",
            });
        }

        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SolveError::Interrupted {
                reason: "time limit reached",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unlimited_never_trips() {
        let mut limit = Limit::none();
        limit.start();
        assert!(limit.check().is_ok());
    }

    #[test]
    fn interrupt_flag_trips() {
        let mut limit = Limit::none();
        limit.start();
        limit.interrupt_handle().store(true, Ordering::Relaxed);
        assert_eq!(
            limit.check(),
            Err(SolveError::Interrupted {
                reason: "interrupt signal received"
            })
        );
    }

    #[test]
    fn zero_budget_trips() {
        let mut limit = Limit::with_time_limit(Duration::ZERO);
        limit.start();
        assert_eq!(
            limit.check(),
            Err(SolveError::Interrupted {
                reason: "time limit reached"
            })
        );
    }

    #[test]
    fn budget_is_not_running_before_start() {
        let limit = Limit::with_time_limit(Duration::ZERO);
        assert!(limit.check().is_ok());
    }
}
