/// Compatibility resolution domain: value types, pure services and policies
pub mod domain;
pub mod policies;
pub mod services;
