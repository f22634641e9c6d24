use super::InstallPlan;
use crate::compatibility::domain::TargetArchitecture;
use crate::ports::outbound::{BinaryArtifact, SandboxExecution, SandboxRequest, SandboxRunner};
use crate::shared::error::SandboxError;
use crate::shared::security::MAX_BINARY_SIZE;
use crate::shared::CancelToken;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Extensions of compiled artifacts worth inspecting
const NATIVE_EXTENSIONS: &[&str] = &["so", "node", "dylib", "pyd", "dll", "bundle"];

/// Grace period for output pipes to drain after the child exits or is killed
const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// NativeSandboxRunner - runs installs with the host package managers
///
/// Each execution gets a fresh temporary directory that receives the whole
/// install. The child process is killed and the directory removed on every
/// exit path: normal exit, timeout, cancellation, or an error while reading
/// back artifacts.
pub struct NativeSandboxRunner {
    target: TargetArchitecture,
}

impl NativeSandboxRunner {
    pub fn new(target: TargetArchitecture) -> Self {
        Self { target }
    }
}

#[async_trait]
impl SandboxRunner for NativeSandboxRunner {
    async fn execute(
        &self,
        request: &SandboxRequest,
        cancel: &CancelToken,
    ) -> Result<SandboxExecution, SandboxError> {
        let sandbox = TempDir::with_prefix("arch-compat-")?;
        let plan = InstallPlan::for_request(request, self.target, sandbox.path())?;
        tracing::debug!(
            ecosystem = %request.ecosystem,
            package = %request.package,
            version = %request.version,
            program = %plan.program,
            "starting sandbox install"
        );
        // `sandbox` is dropped (and removed) when this returns, whatever the outcome
        run_plan(&plan, sandbox.path(), request.timeout, cancel).await
    }
}

/// Runs `plan` inside `root` and collects the compiled artifacts it left there.
pub(crate) async fn run_plan(
    plan: &InstallPlan,
    root: &Path,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<SandboxExecution, SandboxError> {
    for (relative, content) in &plan.files {
        fs::write(root.join(relative), content)?;
    }

    let started = Instant::now();
    let mut child = Command::new(&plan.program)
        .args(&plan.args)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SandboxError::Spawn(format!("{}: {}", plan.program, e)))?;

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let status = tokio::select! {
        status = child.wait() => Some(status?),
        _ = tokio::time::sleep(timeout) => None,
        _ = cancel.cancelled() => {
            terminate(&mut child).await;
            drain(stdout).await;
            drain(stderr).await;
            return Err(SandboxError::Cancelled);
        }
    };

    let Some(status) = status else {
        terminate(&mut child).await;
        drain(stdout).await;
        drain(stderr).await;
        return Err(SandboxError::Timeout(timeout));
    };

    let stdout = drain(stdout).await;
    let stderr = drain(stderr).await;
    let elapsed = started.elapsed();

    let scan_root = root.to_path_buf();
    let binaries = tokio::task::spawn_blocking(move || collect_binaries(&scan_root))
        .await
        .map_err(|e| SandboxError::Io(e.to_string()))??;

    Ok(SandboxExecution {
        exit_code: status.code(),
        stdout,
        stderr,
        elapsed,
        binaries,
    })
}

fn spawn_reader<R>(mut pipe: R) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        // a read error truncates the captured output; the exit status still decides
        let _ = pipe.read_to_end(&mut buffer).await;
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

/// Waits briefly for a pipe reader. Grandchildren that inherited the pipe
/// can keep it open after the child is gone, so the reader is abandoned
/// after [`PIPE_DRAIN_TIMEOUT`].
async fn drain(reader: Option<JoinHandle<String>>) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };
    match tokio::time::timeout(PIPE_DRAIN_TIMEOUT, &mut reader).await {
        Ok(Ok(output)) => output,
        Ok(Err(_)) => String::new(),
        Err(_) => {
            reader.abort();
            String::new()
        }
    }
}

async fn terminate(child: &mut tokio::process::Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill sandbox process");
    }
}

fn is_native_artifact(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let file_name = file_name.to_ascii_lowercase();
    // versioned shared objects: libfoo.so.1.2
    if file_name.contains(".so.") {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| NATIVE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Walks `root` without following symlinks and reads every native artifact
/// within the size cap.
fn collect_binaries(root: &Path) -> Result<Vec<BinaryArtifact>, SandboxError> {
    let mut binaries = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = fs::symlink_metadata(&path) else {
                continue;
            };
            if metadata.is_dir() {
                pending.push(path);
            } else if metadata.is_file()
                && metadata.len() <= MAX_BINARY_SIZE
                && is_native_artifact(&path)
            {
                let bytes = fs::read(&path)?;
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                binaries.push(BinaryArtifact {
                    path: relative,
                    bytes,
                });
            }
        }
    }

    binaries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(binaries)
}
