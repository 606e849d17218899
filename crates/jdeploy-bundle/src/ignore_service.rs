//! Ignore-file resolution for a project.
//!
//! [`IgnoreService`] loads `.jdpignore` and `.jdpignore.<platform>` lazily and
//! keeps the parsed patterns in an explicit cache owned by the service. A
//! generation run constructs one service and drops it at the end.

use crate::archive::EntryFilter;
use crate::ignore::{global_ignore_file, parse_ignore_file, platform_ignore_file};
use crate::{NamespacePattern, Platform, Project};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scope {
    Global,
    Platform(Platform),
}

/// Cached ignore-file lookups.
#[derive(Debug, Default)]
pub struct IgnoreService {
    cache: HashMap<(PathBuf, Scope), Vec<NamespacePattern>>,
}

/// Pattern counts for one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternCounts {
    pub total: usize,
    pub keep: usize,
    pub ignore: usize,
}

impl PatternCounts {
    fn of(patterns: &[NamespacePattern]) -> Self {
        let keep = patterns.iter().filter(|p| p.is_keep()).count();
        Self {
            total: patterns.len(),
            keep,
            ignore: patterns.len() - keep,
        }
    }
}

/// Platform-scoped part of [`PatternStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCounts {
    pub platform: Platform,
    pub counts: PatternCounts,
}

/// Diagnostic pattern counts for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternStatistics {
    pub global: PatternCounts,
    /// Present only when statistics were requested for a platform.
    pub platform: Option<PlatformCounts>,
}

/// A snapshot of the global and platform rules for one platform.
///
/// Used by the archive rewriter as its per-entry decision.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    global: Vec<NamespacePattern>,
    platform: Vec<NamespacePattern>,
}

impl IgnoreRules {
    /// Whether both scopes are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.platform.is_empty()
    }
}

impl EntryFilter for IgnoreRules {
    fn includes(&self, entry_path: &str) -> bool {
        resolve(&self.global, &self.platform, entry_path)
    }
}

impl IgnoreService {
    /// Create a service with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns of the project's global `.jdpignore`.
    pub fn global_patterns(&mut self, project: &Project) -> &[NamespacePattern] {
        self.patterns(project.project_dir(), Scope::Global)
    }

    /// Patterns of the project's `.jdpignore.<platform>`.
    ///
    /// Always empty for [`Platform::Default`].
    pub fn platform_patterns(
        &mut self,
        project: &Project,
        platform: Platform,
    ) -> &[NamespacePattern] {
        if platform.is_default() {
            return &[];
        }
        self.patterns(project.project_dir(), Scope::Platform(platform))
    }

    /// Drop every cached pattern list.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Decide whether an entry is included for `platform`.
    ///
    /// A missing path is always included. Keep rules from either scope win
    /// over strip rules; entries matching nothing are included.
    pub fn should_include_file(
        &mut self,
        project: &Project,
        entry_path: Option<&str>,
        platform: Platform,
    ) -> bool {
        let Some(entry_path) = entry_path else {
            return true;
        };

        let dir = project.project_dir();
        self.ensure_loaded(dir, Scope::Global);
        if !platform.is_default() {
            self.ensure_loaded(dir, Scope::Platform(platform));
        }

        let global = self.cached(dir, Scope::Global);
        let specific = if platform.is_default() {
            &[]
        } else {
            self.cached(dir, Scope::Platform(platform))
        };
        resolve(global, specific, entry_path)
    }

    /// Snapshot the rules applying to `platform`.
    pub fn rules_for(&mut self, project: &Project, platform: Platform) -> IgnoreRules {
        IgnoreRules {
            global: self.global_patterns(project).to_vec(),
            platform: self.platform_patterns(project, platform).to_vec(),
        }
    }

    /// Whether the global file or any platform file exists on disk.
    #[must_use]
    pub fn has_ignore_files(&self, project: &Project) -> bool {
        let dir = project.project_dir();
        global_ignore_file(dir).is_file()
            || Platform::all()
                .iter()
                .any(|platform| platform_ignore_file(dir, *platform).is_file())
    }

    /// Count patterns per scope. `platform == None` leaves out the platform
    /// counters.
    pub fn pattern_statistics(
        &mut self,
        project: &Project,
        platform: Option<Platform>,
    ) -> PatternStatistics {
        let global = PatternCounts::of(self.global_patterns(project));
        let platform = platform.map(|platform| PlatformCounts {
            platform,
            counts: PatternCounts::of(self.platform_patterns(project, platform)),
        });

        PatternStatistics { global, platform }
    }

    fn patterns(&mut self, dir: &Path, scope: Scope) -> &[NamespacePattern] {
        self.ensure_loaded(dir, scope);
        self.cached(dir, scope)
    }

    fn cached(&self, dir: &Path, scope: Scope) -> &[NamespacePattern] {
        self.cache
            .get(&(dir.to_path_buf(), scope))
            .map_or(&[], Vec::as_slice)
    }

    fn ensure_loaded(&mut self, dir: &Path, scope: Scope) {
        let key = (dir.to_path_buf(), scope);
        if self.cache.contains_key(&key) {
            return;
        }

        let file = match scope {
            Scope::Global => global_ignore_file(dir),
            Scope::Platform(platform) => platform_ignore_file(dir, platform),
        };

        let patterns = if file.is_file() {
            parse_ignore_file(&file).unwrap_or_else(|e| {
                tracing::warn!("Failed to read ignore file {}: {}", file.display(), e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        tracing::debug!("Loaded {} patterns from {}", patterns.len(), file.display());
        self.cache.insert(key, patterns);
    }
}

fn resolve(global: &[NamespacePattern], platform: &[NamespacePattern], entry_path: &str) -> bool {
    let mut all = global.iter().chain(platform);
    if all.clone().any(|p| p.is_keep() && p.matches(entry_path)) {
        return true;
    }
    !all.any(|p| p.is_ignore() && p.matches(entry_path))
}
