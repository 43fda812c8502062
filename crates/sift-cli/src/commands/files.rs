//! Shared file collection utilities for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

/// Extension of the files the linter reads.
const SOURCE_EXTENSION: &str = "cs";

/// Directory names never descended into (besides hidden ones).
const SKIPPED_DIRS: &[&str] = &["bin", "obj"];

/// Collect all C# source files from the given paths (files or directories),
/// sorted and without duplicates.
pub fn collect_source_files(paths: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_file() {
            // Explicitly named files are linted whatever their extension.
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            collect_in_dir(path, &mut files)?;
        } else {
            bail!("no such file or directory: {}", path_str);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Recursively collect `.cs` files in a directory.
fn collect_in_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if name_str.starts_with('.') || SKIPPED_DIRS.contains(&name_str.as_ref()) {
                continue;
            }
            collect_in_dir(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}
