use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum size of a knowledge base, deny list, component or result file (100 MB)
pub const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum size of a compiled artifact read back from a sandbox for inspection (64 MB)
pub const MAX_BINARY_SIZE: u64 = 64 * 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is checked, not its target.
///
/// # Errors
/// Returns an error if the path doesn't exist, is a symbolic link, or is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {} metadata for {}: {}",
            file_description,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(())
}

/// Validates file size is within acceptable limits
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

/// Reads a UTF-8 input file after the regular-file and size checks.
pub fn read_checked_file(path: &Path, file_description: &str) -> Result<String> {
    validate_regular_file(path, file_description)?;
    let size = fs::metadata(path)?.len();
    validate_file_size(size, path, MAX_INPUT_FILE_SIZE)?;

    fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {} {}: {}",
            file_description,
            path.display(),
            e
        )
    })
}

/// Rejects package names/versions that could alter a registry URL.
///
/// Maven coordinates (`group:artifact`) and npm scopes (`@scope/name`) are
/// legitimate, so `:` `@` and a single `/` after a scope are allowed.
pub fn validate_url_component(component: &str, component_type: &str) -> Result<()> {
    if component.contains('\\') || component.contains("..") {
        anyhow::bail!(
            "Security: {} contains path traversal characters which are not allowed",
            component_type
        );
    }

    let slash_count = component.matches('/').count();
    if slash_count > 1 || (slash_count == 1 && !component.starts_with('@')) {
        anyhow::bail!(
            "Security: {} contains path separators which are not allowed",
            component_type
        );
    }

    if component.contains('#') || component.contains('?') || component.contains('%') {
        anyhow::bail!(
            "Security: {} contains URL-unsafe characters",
            component_type
        );
    }

    if component.chars().any(|c| c.is_control() || c.is_whitespace()) {
        anyhow::bail!(
            "Security: {} contains whitespace or control characters",
            component_type
        );
    }

    Ok(())
}
