//! Copy resolved artifacts into the destination directory.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::fallback::FALLBACK_TYPE;
use crate::runtime::Runtime;

/// Extension given to `srcaar` files in the destination.
pub const AAR_EXTENSION: &str = "aar";

/// Destination file name for a resolved file, with `.srcaar` renamed to `.aar`.
pub fn destination_name(file: &Path) -> Option<PathBuf> {
    let name = PathBuf::from(file.file_name()?);
    if name.extension().is_some_and(|e| e == FALLBACK_TYPE) {
        Some(name.with_extension(AAR_EXTENSION))
    } else {
        Some(name)
    }
}

/// Copy `files` into `dest`, returning the names written in input order.
///
/// The destination directory is created when missing. Any failed copy
/// aborts the whole step.
#[tracing::instrument(skip(runtime, files))]
pub fn copy_artifacts<R: Runtime>(
    runtime: &R,
    files: &[PathBuf],
    dest: &Path,
) -> Result<Vec<String>> {
    if !runtime.exists(dest) {
        debug!("Creating destination directory {:?}", dest);
        runtime
            .create_dir_all(dest)
            .with_context(|| format!("Failed to create destination directory {:?}", dest))?;
    }

    let mut copied = Vec::with_capacity(files.len());
    for file in files {
        let name = destination_name(file)
            .with_context(|| format!("Resolved file {:?} has no file name", file))?;
        let target = dest.join(&name);
        runtime
            .copy(file, &target)
            .with_context(|| format!("Failed to copy {:?} to {:?}", file, target))?;
        info!("Copied {:?} to {:?}", file, target);
        copied.push(name.to_string_lossy().into_owned());
    }
    Ok(copied)
}
