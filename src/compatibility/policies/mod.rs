mod fast_path;
mod registry_rules;

pub use fast_path::{FastPathEntry, FastPathTable, FAST_PATH_CONFIDENCE};
pub use registry_rules::{RegistryRules, RegistryVerdict};
