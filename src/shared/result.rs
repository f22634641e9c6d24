/// Crate-wide Result alias with anyhow::Error as the error type.
///
/// Typed failures (`CompatError`, `RegistryError`, `SandboxError`) convert into it
/// at layer boundaries.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
