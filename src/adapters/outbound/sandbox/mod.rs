/// Sandbox runner adapters for isolated package installs
mod disabled;
mod install_plan;
mod native_runner;

pub use disabled::DisabledSandbox;
pub use install_plan::InstallPlan;
pub use native_runner::NativeSandboxRunner;
