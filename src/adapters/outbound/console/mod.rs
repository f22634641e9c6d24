/// Console adapters for user-facing progress and summaries
mod progress_reporter;
mod summary;

pub use progress_reporter::StderrProgressReporter;
pub use summary::render_summary;
