//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use att_core::Directory;

/// Reads and parses the attendance fixture file.
pub fn load_directory(path: &Path) -> Result<Directory> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let directory = Directory::from_json(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        employees = directory.employees.len(),
        "loaded attendance data"
    );
    Ok(directory)
}

/// `1 day`, `2 days`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
