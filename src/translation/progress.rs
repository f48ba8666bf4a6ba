/*!
 * Progress reporting hook.
 *
 * The pipeline announces the total number of units before dispatching and
 * then reports a monotonically increasing completed count. Reporters only
 * observe; they cannot influence the run.
 */

/// Receives unit-completion counts
pub trait ProgressReporter: Send + Sync {
    /// Called once, before any unit completes
    fn start(&self, total: usize);

    /// Called with the running total of completed units
    fn advance(&self, completed: usize);

    /// Called once after the last unit
    fn finish(&self) {}
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&self, _total: usize) {}

    fn advance(&self, _completed: usize) {}
}
