//! Header stamping over a source directory.
//!
//! Every released source file carries a fixed license/version comment block.
//! `stamp` prepends the block to unstamped files and skips files that
//! already contain the marker string; `sync` rewrites the stamped version to
//! match the manifest; `check` reports drift without writing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DoctorError, Result};

/// Marker string identifying an already-stamped file.
pub const HEADER_MARKER: &str = "frankendom v";

/// The comment block prepended to each source file.
#[must_use]
pub fn header_block(version: &str) -> String {
    format!(
        "/*\n * frankendom v{version} https://github.com/Dicklesworthstone/frankendom\n * (c) 2026 Dicklesworthstone - Released under the MIT License (https://github.com/Dicklesworthstone/frankendom/blob/master/LICENSE)\n */\n\n"
    )
}

/// Read the package version from a workspace or package manifest.
pub fn manifest_version(manifest: &Path) -> Result<String> {
    if !manifest.exists() {
        return Err(DoctorError::MissingPath {
            path: manifest.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(manifest)?;
    let value: toml::Value = toml::from_str(&raw)?;
    value
        .get("workspace")
        .and_then(|workspace| workspace.get("package"))
        .or_else(|| value.get("package"))
        .and_then(|package| package.get("version"))
        .and_then(toml::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DoctorError::MissingVersion {
            path: manifest.to_path_buf(),
        })
}

/// The version a stamped file declares, if any.
#[must_use]
pub fn stamped_version(content: &str) -> Option<&str> {
    let start = content.find(HEADER_MARKER)? + HEADER_MARKER.len();
    let rest = &content[start..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Source files (non-recursive) with the given extension, sorted for
/// deterministic output.
pub fn source_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DoctorError::MissingPath {
            path: dir.to_path_buf(),
        });
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(extension)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[derive(Debug, Default)]
pub struct StampOutcome {
    pub stamped: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Prepend the header block to every unstamped source file.
pub fn stamp_sources(dir: &Path, extension: &str, version: &str) -> Result<StampOutcome> {
    let block = header_block(version);
    let mut outcome = StampOutcome::default();
    for path in source_files(dir, extension)? {
        let content = fs::read_to_string(&path)?;
        if content.contains(HEADER_MARKER) {
            outcome.skipped.push(path);
            continue;
        }
        fs::write(&path, format!("{block}{content}"))?;
        outcome.stamped.push(path);
    }
    Ok(outcome)
}

#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub unstamped: Vec<PathBuf>,
}

/// Rewrite the stamped version in every stamped source file. Unstamped
/// files are left untouched.
pub fn sync_versions(dir: &Path, extension: &str, version: &str) -> Result<SyncOutcome> {
    let mut outcome = SyncOutcome::default();
    for path in source_files(dir, extension)? {
        let content = fs::read_to_string(&path)?;
        match stamped_version(&content) {
            None => outcome.unstamped.push(path),
            Some(found) if found == version => outcome.unchanged.push(path),
            Some(found) => {
                let old = format!("{HEADER_MARKER}{found}");
                let new = format!("{HEADER_MARKER}{version}");
                fs::write(&path, content.replacen(&old, &new, 1))?;
                outcome.updated.push(path);
            }
        }
    }
    Ok(outcome)
}

/// A file whose header disagrees with the manifest.
#[derive(Debug, PartialEq, Eq)]
pub enum Drift {
    Missing(PathBuf),
    Stale { path: PathBuf, found: String },
}

/// Report files with a missing or stale header, without writing.
pub fn check_sources(dir: &Path, extension: &str, version: &str) -> Result<Vec<Drift>> {
    let mut drift = Vec::new();
    for path in source_files(dir, extension)? {
        let content = fs::read_to_string(&path)?;
        match stamped_version(&content) {
            None => drift.push(Drift::Missing(path)),
            Some(found) if found != version => drift.push(Drift::Stale {
                path,
                found: found.to_string(),
            }),
            Some(_) => {}
        }
    }
    Ok(drift)
}
