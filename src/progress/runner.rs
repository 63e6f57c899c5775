//! Parallel fan-out of named tasks with shared progress display.
//!
//! [`run_parallel`] executes a batch of labelled, fallible closures on worker
//! threads, animating each through a [`ProgressTracker`], and returns results
//! in submission order. Failures are contained: a failed task yields a `None`
//! slot and one error line, never an error out of the runner. One failed
//! extraction must not block unrelated successful ones from being reported.

use super::{ProgressTracker, SpinnerStyle};
use crate::error::{GleanError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// A labelled unit of work for [`run_parallel`].
pub struct Task<T> {
    label: String,
    work: Box<dyn FnOnce() -> Result<T> + Send>,
}

impl<T> Task<T> {
    pub fn new(
        label: impl Into<String>,
        work: impl FnOnce() -> Result<T> + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            work: Box::new(work),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Run all tasks concurrently, one worker thread each, and collect results
/// in submission order.
///
/// Slot `i` holds `Some(value)` if task `i` succeeded and `None` if it
/// failed; failures additionally emit `Error in <label>: <error>` through
/// the tracker. Blocks the calling thread until every task has finished.
///
/// There is no cancellation or timeout: a hung task (e.g. an external tool
/// waiting on the network) blocks the whole batch. Callers submitting work
/// that may hang should enforce timeouts inside the task itself.
pub fn run_parallel<T: Send + 'static>(
    tracker: &ProgressTracker,
    style: SpinnerStyle,
    tasks: Vec<Task<T>>,
) -> Vec<Option<T>> {
    if tasks.is_empty() {
        return Vec::new();
    }

    thread::scope(|scope| {
        let workers: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let tracker = tracker.clone();
                scope.spawn(move || run_one(&tracker, style, task))
            })
            .collect();

        // Joining in spawn order preserves submission order regardless of
        // completion order.
        workers
            .into_iter()
            .map(|w| w.join().unwrap_or(None))
            .collect()
    })
}

/// Execute a single task with start/stop bookkeeping.
fn run_one<T>(tracker: &ProgressTracker, style: SpinnerStyle, task: Task<T>) -> Option<T> {
    let Task { label, work } = task;

    tracker.start(&label, style);

    // A panicking task counts as a failure; stop() must still run so the
    // active-set accounting stays balanced.
    let result = panic::catch_unwind(AssertUnwindSafe(work))
        .unwrap_or_else(|_| Err(GleanError::Task(format!("{label} panicked"))));

    tracker.stop(&label, result.is_ok());

    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracker.println(&format!("Error in {label}: {e}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::SharedBuf;
    use super::*;
    use std::time::{Duration, Instant};

    fn tracker() -> (ProgressTracker, SharedBuf) {
        let buf = SharedBuf::default();
        (ProgressTracker::with_writer(buf.clone()), buf)
    }

    #[test]
    fn test_empty_input_returns_immediately() {
        let (tracker, buf) = tracker();
        let results: Vec<Option<u32>> = run_parallel(&tracker, SpinnerStyle::Dots, Vec::new());
        assert!(results.is_empty());
        // No renderer was started, so nothing was written.
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_results_in_submission_order() {
        let (tracker, _) = tracker();

        let tasks = vec![
            Task::new("slow", || {
                std::thread::sleep(Duration::from_millis(150));
                Ok("first")
            }),
            Task::new("fast", || Ok("second")),
        ];

        let results = run_parallel(&tracker, SpinnerStyle::Dots, tasks);
        assert_eq!(results, vec![Some("first"), Some("second")]);
    }

    #[test]
    fn test_failure_yields_none_and_one_error_line() {
        let (tracker, buf) = tracker();

        let tasks = vec![
            Task::new("A", || Ok(1)),
            Task::new("B", || Err(GleanError::Task("division by zero".into()))),
            Task::new("C", || Ok(3)),
        ];

        let results = run_parallel(&tracker, SpinnerStyle::Dots, tasks);
        assert_eq!(results, vec![Some(1), None, Some(3)]);

        let out = buf.contents();
        assert_eq!(out.matches("Error in B:").count(), 1);
        assert!(out.contains("division by zero"));
        assert!(out.contains("✓ A"));
        assert!(out.contains("✗ B"));
        assert!(out.contains("✓ C"));
    }

    #[test]
    fn test_tasks_run_concurrently() {
        let (tracker, _) = tracker();

        let tasks: Vec<Task<u64>> = [300u64, 100, 200]
            .into_iter()
            .map(|ms| {
                Task::new(format!("sleep {ms}"), move || {
                    std::thread::sleep(Duration::from_millis(ms));
                    Ok(ms)
                })
            })
            .collect();

        let started = Instant::now();
        let results = run_parallel(&tracker, SpinnerStyle::Dots, tasks);
        let elapsed = started.elapsed();

        assert_eq!(results, vec![Some(300), Some(100), Some(200)]);
        // Serial execution would need 600ms; allow slack for slow CI.
        assert!(
            elapsed < Duration::from_millis(550),
            "tasks appear to have run serially: {elapsed:?}"
        );
    }

    #[test]
    fn test_no_renderer_output_after_batch_completes() {
        let (tracker, buf) = tracker();

        let tasks = vec![Task::new("only", || {
            std::thread::sleep(Duration::from_millis(250));
            Ok(())
        })];
        run_parallel(&tracker, SpinnerStyle::Dots, tasks);

        assert_eq!(tracker.active_count(), 0);
        let settled = buf.len();
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(buf.len(), settled, "renderer wrote after the last stop");
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let (tracker, buf) = tracker();

        let tasks: Vec<Task<u32>> = vec![
            Task::new("steady", || Ok(1)),
            Task::new("explosive", || panic!("kaboom")),
        ];

        let results = run_parallel(&tracker, SpinnerStyle::Dots, tasks);
        assert_eq!(results, vec![Some(1), None]);
        assert_eq!(tracker.active_count(), 0);
        assert!(buf.contents().contains("Error in explosive:"));
    }

    #[test]
    fn test_duplicate_labels_do_not_corrupt_accounting() {
        let (tracker, _) = tracker();

        let tasks: Vec<Task<u32>> = (0..4)
            .map(|i| {
                Task::new("same label", move || {
                    std::thread::sleep(Duration::from_millis(20 * (i + 1)));
                    Ok(i as u32)
                })
            })
            .collect();

        let results = run_parallel(&tracker, SpinnerStyle::Dots, tasks);
        assert_eq!(results, vec![Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(tracker.active_count(), 0);
    }
}
