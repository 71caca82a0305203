//! Hydration flamegraph file.
//!
//! The SVG is staged in a temporary file beside its destination and renamed
//! into place, so a viewer polling `hydration.svg` never sees half a graph.

use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Save a rendered hydration flamegraph to `output_path`
///
/// Missing parent directories are created. An existing file is replaced.
///
/// # Errors
/// * `OutputError::NotSvg` - `document` has no `<svg` or `<?xml` root
/// * `OutputError::InvalidPath` - empty path, a directory, or an uncreatable parent
/// * `OutputError::WriteFailed` - staging or renaming failed
pub fn write_svg(document: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    super::validate_path(output_path)?;
    check_svg_root(document)?;

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        debug!("Creating {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            OutputError::InvalidPath(format!("Cannot create {}: {}", dir.display(), e))
        })?;
    }

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(document.as_bytes())?;
    staged.persist(output_path).map_err(|e| e.error)?;

    info!(
        "Hydration flamegraph: {} ({} bytes)",
        output_path.display(),
        document.len()
    );
    Ok(())
}

fn check_svg_root(document: &str) -> Result<(), OutputError> {
    let head = document.trim_start();
    if head.starts_with("<svg") || head.starts_with("<?xml") {
        return Ok(());
    }
    Err(OutputError::NotSvg(head.chars().take(16).collect()))
}
