use arch_compat::ports::outbound::{SandboxExecution, SandboxRequest, SandboxRunner};
use arch_compat::shared::error::SandboxError;
use arch_compat::shared::CancelToken;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted SandboxRunner: listed versions install, the rest fail to compile
pub struct MockSandboxRunner {
    passing: Vec<String>,
    executed: Mutex<Vec<String>>,
}

impl MockSandboxRunner {
    pub fn passing(versions: &[&str]) -> Self {
        Self {
            passing: versions.iter().map(|v| v.to_string()).collect(),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// `package@version` in execution order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SandboxRunner for MockSandboxRunner {
    async fn execute(
        &self,
        request: &SandboxRequest,
        _cancel: &CancelToken,
    ) -> Result<SandboxExecution, SandboxError> {
        self.executed
            .lock()
            .unwrap()
            .push(format!("{}@{}", request.package, request.version));

        let passes = self.passing.contains(&request.version);
        Ok(SandboxExecution {
            exit_code: Some(if passes { 0 } else { 1 }),
            stdout: String::new(),
            stderr: if passes {
                String::new()
            } else {
                "error: command 'gcc' failed with exit status 1".to_string()
            },
            elapsed: Duration::from_millis(3),
            binaries: Vec::new(),
        })
    }
}
