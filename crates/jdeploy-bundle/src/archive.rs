//! In-place archive (jar) rewriting.
//!
//! Retained entries are copied raw: compressed bytes, timestamps, extra
//! fields and permissions are carried over unchanged. The new archive is
//! built in a temporary file next to the source and then persisted over it,
//! so a crash leaves either the original or the complete replacement.

use crate::{BundleError, BundleResult, NamespacePattern, Platform};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::{ZipArchive, ZipWriter};

/// File extension of the archives processed inside a bundle.
pub const ARCHIVE_EXTENSION: &str = "jar";

/// Per-entry inclusion decision.
pub trait EntryFilter {
    /// Whether the entry at `entry_path` is written to the rewritten archive.
    fn includes(&self, entry_path: &str) -> bool;
}

/// Both filters in turn: an entry survives only if each includes it.
impl<A: EntryFilter, B: EntryFilter> EntryFilter for (A, B) {
    fn includes(&self, entry_path: &str) -> bool {
        self.0.includes(entry_path) && self.1.includes(entry_path)
    }
}

/// Strip and keep rules built from namespace lists.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRules {
    strip: Vec<NamespacePattern>,
    keep: Vec<NamespacePattern>,
}

impl NamespaceRules {
    /// Build rules from namespace strings in any notation.
    ///
    /// Blank strings are skipped.
    #[must_use]
    pub fn new<S: AsRef<str>>(strip: &[S], keep: &[S]) -> Self {
        let compile = |items: &[S], keep: bool| -> Vec<NamespacePattern> {
            items
                .iter()
                .filter_map(|item| NamespacePattern::namespace(item.as_ref(), keep))
                .collect()
        };

        Self {
            strip: compile(strip, false),
            keep: compile(keep, true),
        }
    }

    /// Whether there is nothing to strip or keep.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strip.is_empty() && self.keep.is_empty()
    }
}

impl EntryFilter for NamespaceRules {
    fn includes(&self, entry_path: &str) -> bool {
        if self.keep.iter().any(|p| p.matches(entry_path)) {
            return true;
        }
        !self.strip.iter().any(|p| p.matches(entry_path))
    }
}

/// Outcome of one rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Entries written to the output archive.
    pub retained: usize,
    /// Entries left out.
    pub removed: usize,
}

impl RewriteSummary {
    /// Whether the rewrite changed anything.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.removed > 0
    }
}

/// Rewrite the archive at `path` in place, keeping entries that match
/// `keep`, dropping entries that match `strip` and keeping everything else.
///
/// A missing `path` is a configuration error. When both lists are empty the
/// archive is left untouched.
pub fn process_archive_for_platform<S: AsRef<str>>(
    path: &Path,
    strip: &[S],
    keep: &[S],
) -> BundleResult<RewriteSummary> {
    require_archive(path)?;

    let rules = NamespaceRules::new(strip, keep);
    if rules.is_empty() {
        return Ok(RewriteSummary {
            retained: entry_names(path)?.len(),
            removed: 0,
        });
    }

    process_archive_with(path, &rules)
}

/// Remove `namespaces` from the archive at `path`.
pub fn strip_namespaces<S: AsRef<str>>(
    path: &Path,
    namespaces: &[S],
) -> BundleResult<RewriteSummary> {
    process_archive_for_platform(path, namespaces, &[])
}

/// Rewrite the archive at `path` in place using an arbitrary filter.
pub fn process_archive_with(path: &Path, filter: &dyn EntryFilter) -> BundleResult<RewriteSummary> {
    require_archive(path)?;

    let dir = parent_dir(path);
    let (temp, summary) = rewrite(path, dir, filter)?;

    if !summary.is_modified() {
        tracing::debug!("{}: nothing to remove", path.display());
        return Ok(summary);
    }

    let permissions = fs::metadata(path)?.permissions();
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| BundleError::Io(e.error))?;

    tracing::debug!(
        "{}: retained {} entries, removed {}",
        path.display(),
        summary.retained,
        summary.removed
    );
    Ok(summary)
}

/// Write a filtered copy of `path` named `<base>-<platform>.<ext>` next to
/// it, leaving the source untouched.
///
/// `platform` is required; `None` is a configuration error.
pub fn create_platform_specific_archive<S: AsRef<str>>(
    path: &Path,
    platform: Option<Platform>,
    strip: &[S],
    keep: &[S],
) -> BundleResult<PathBuf> {
    require_archive(path)?;
    let platform = platform
        .ok_or_else(|| BundleError::InvalidConfig("Target platform is required".to_string()))?;

    let output = platform_specific_path(path, platform);
    let rules = NamespaceRules::new(strip, keep);

    if rules.is_empty() {
        fs::copy(path, &output)?;
        return Ok(output);
    }

    let (temp, _) = rewrite(path, parent_dir(path), &rules)?;
    fs::set_permissions(temp.path(), fs::metadata(path)?.permissions())?;
    temp.persist(&output).map_err(|e| BundleError::Io(e.error))?;
    Ok(output)
}

/// `<dir>/<base>-<platform>.<ext>` for `path`.
#[must_use]
pub fn platform_specific_path(path: &Path, platform: Platform) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| ARCHIVE_EXTENSION.to_string());

    parent_dir(path).join(format!("{stem}-{}.{extension}", platform.as_str()))
}

/// Every `.jar` file under `dir`, recursively, in a stable order.
#[must_use]
pub fn find_archives(dir: &Path) -> Vec<PathBuf> {
    let mut archives: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable path under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_archive(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    archives.sort();
    archives
}

/// Whether `path` has the archive extension (case-insensitive).
#[must_use]
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Names of all entries in the archive at `path`, in archive order.
pub fn entry_names(path: &Path) -> BundleResult<Vec<String>> {
    let archive = ZipArchive::new(File::open(path)?)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

fn require_archive(path: &Path) -> BundleResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(BundleError::InvalidConfig(format!(
            "Archive file must exist: {}",
            path.display()
        )))
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn rewrite(
    source: &Path,
    temp_dir: &Path,
    filter: &dyn EntryFilter,
) -> BundleResult<(NamedTempFile, RewriteSummary)> {
    let mut archive = ZipArchive::new(File::open(source)?)?;
    let mut temp = NamedTempFile::new_in(temp_dir)?;
    let mut summary = RewriteSummary::default();

    {
        let mut writer = ZipWriter::new(temp.as_file_mut());
        writer.set_raw_comment(archive.comment().into());

        // Repeated names are already collapsed by `ZipArchive`.
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;

            if !filter.includes(entry.name()) {
                summary.removed += 1;
                continue;
            }

            writer.raw_copy_file(entry)?;
            summary.retained += 1;
        }

        writer.finish()?;
    }

    Ok((temp, summary))
}
