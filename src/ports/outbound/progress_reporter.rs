/// ProgressReporter port for reporting progress during an analysis run
///
/// This port abstracts user-facing progress output (e.g., to stderr) from
/// structured logging, which goes through `tracing`.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress with a position
    ///
    /// # Arguments
    /// * `current` - Current progress value
    /// * `total` - Total expected value
    /// * `message` - Optional message to include
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a non-fatal problem
    fn report_error(&self, message: &str);

    /// Reports completion of a phase
    fn report_completion(&self, message: &str);
}
