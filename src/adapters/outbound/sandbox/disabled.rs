use crate::compatibility::domain::Ecosystem;
use crate::ports::outbound::{SandboxExecution, SandboxRequest, SandboxRunner};
use crate::shared::error::SandboxError;
use crate::shared::CancelToken;
use async_trait::async_trait;

/// DisabledSandbox - runner used when sandbox testing was not opted into
pub struct DisabledSandbox;

#[async_trait]
impl SandboxRunner for DisabledSandbox {
    async fn execute(
        &self,
        request: &SandboxRequest,
        _cancel: &CancelToken,
    ) -> Result<SandboxExecution, SandboxError> {
        Err(SandboxError::InvalidRequest(format!(
            "sandbox testing is disabled ({} {})",
            request.package, request.version
        )))
    }

    fn supports(&self, _ecosystem: Ecosystem) -> bool {
        false
    }
}
