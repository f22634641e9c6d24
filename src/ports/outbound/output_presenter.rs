use crate::shared::Result;

/// OutputPresenter port - destination of a serialized report, manifest or
/// partial result set
pub trait OutputPresenter {
    /// Writes the already-serialized document
    ///
    /// # Errors
    /// Fails when the destination rejects the write (permissions, missing
    /// parent directory, symlinked target)
    fn present(&self, content: &str) -> Result<()>;
}
