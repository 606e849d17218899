//! `.jdpignore` file parsing.
//!
//! File format:
//!
//! ```text
//! # comment
//! com.example.native        <- strip rule (package notation)
//! /native/windows/          <- strip rule (path notation)
//! *.dll                     <- strip rule (glob)
//! !/native/windows/x64      <- keep rule, overrides strip rules
//! ```

use crate::{BundleResult, NamespacePattern, Platform};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the global ignore file.
pub const IGNORE_FILE: &str = ".jdpignore";

/// Path of the global ignore file next to a project's manifest.
#[must_use]
pub fn global_ignore_file(project_dir: &Path) -> PathBuf {
    project_dir.join(IGNORE_FILE)
}

/// Path of a platform's ignore file (`.jdpignore.<platform>`).
#[must_use]
pub fn platform_ignore_file(project_dir: &Path, platform: Platform) -> PathBuf {
    project_dir.join(format!("{IGNORE_FILE}.{}", platform.as_str()))
}

/// Parse ignore-file text into an ordered list of patterns.
#[must_use]
pub fn parse_ignore_str(content: &str) -> Vec<NamespacePattern> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let pattern = NamespacePattern::parse(line);
            if pattern.is_none() {
                tracing::warn!("Invalid pattern on line {}: {}", index + 1, line);
            }
            pattern
        })
        .collect()
}

/// Parse an ignore file.
///
/// A missing file yields no patterns. Read failures are returned to the
/// caller; [`crate::IgnoreService`] is the layer that treats them as empty.
pub fn parse_ignore_file<P: AsRef<Path>>(path: P) -> BundleResult<Vec<NamespacePattern>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    Ok(parse_ignore_str(&content))
}

/// Keep only the strip rules.
#[must_use]
pub fn ignore_patterns(patterns: &[NamespacePattern]) -> Vec<NamespacePattern> {
    patterns.iter().filter(|p| p.is_ignore()).cloned().collect()
}

/// Keep only the keep rules.
#[must_use]
pub fn keep_patterns(patterns: &[NamespacePattern]) -> Vec<NamespacePattern> {
    patterns.iter().filter(|p| p.is_keep()).cloned().collect()
}
