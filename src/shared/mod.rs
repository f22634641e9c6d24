/// Shared utilities used across all layers
pub mod cancellation;
pub mod error;
pub mod result;
pub mod security;
pub mod telemetry;

pub use cancellation::{CancelToken, CancellationSignal};
pub use result::Result;
