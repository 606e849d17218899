//! Namespace patterns and archive entry matching.
//!
//! A pattern is one rule line from a `.jdpignore` file or one entry of a
//! `nativeNamespaces` list. These notations are accepted:
//!
//! | Notation      | Example                | Matches                                    |
//! |---------------|------------------------|--------------------------------------------|
//! | Package       | `com.example.native`   | `com/example/native` and everything below  |
//! | Absolute path | `/native/windows/`     | `native/windows` and everything below      |
//! | Relative path | `native/windows`       | same as absolute                           |
//! | Bare name     | `debug`                | `debug` and below, and `debug.*` anywhere  |
//! | Glob          | `*.dll`, `win32-*`     | any path segment matching the glob         |
//!
//! Only a bare name matches by file stem; `/debug` is an absolute path.

use glob::{MatchOptions, Pattern};
use std::fmt;

/// How a pattern's text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Dotted Java package, e.g. `com.example.native`.
    Package,
    /// Slash separated path, absolute (`/native/`) or relative (`native/win`).
    Path,
    /// Filename glob, e.g. `*.dll`.
    Glob,
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum Matcher {
    /// `entry == probe` or `entry` lives under `probe/`.
    Prefix(String),
    /// A [`Matcher::Prefix`] that also names a class and its inner classes.
    Package(String),
    /// A relative single-segment name: a [`Matcher::Prefix`] that also
    /// matches files of that stem anywhere in the archive.
    Name(String),
    /// Glob tested against every single path segment.
    Segment(Pattern),
    /// Glob anchored at the archive root, tested against every leading run
    /// of segments.
    Anchored(Pattern),
}

/// One parsed namespace rule.
#[derive(Debug, Clone)]
pub struct NamespacePattern {
    raw: String,
    keep: bool,
    notation: Notation,
    matcher: Matcher,
}

impl NamespacePattern {
    /// Parse one ignore-file line.
    ///
    /// Returns `None` for blank lines, comments and lines that carry no
    /// pattern text (a lone `!` or `/`). A leading `!` marks a keep rule; the
    /// raw text keeps the marker.
    ///
    /// # Example
    ///
    /// ```
    /// use jdeploy_bundle::{NamespacePattern, Notation};
    ///
    /// let pattern = NamespacePattern::parse("!com.example.native").unwrap();
    /// assert!(pattern.is_keep());
    /// assert_eq!(pattern.notation(), Notation::Package);
    /// assert!(pattern.matches("com/example/native/Lib.class"));
    /// assert!(!pattern.matches("com/example/natives/Lib.class"));
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        match trimmed.strip_prefix('!') {
            Some(rest) => Self::build(trimmed, rest.trim(), true),
            None => Self::build(trimmed, trimmed, false),
        }
    }

    /// Build a pattern from a declared namespace (no `!` handling, the list
    /// it came from decides whether it is a keep rule).
    #[must_use]
    pub fn namespace(text: &str, keep: bool) -> Option<Self> {
        let trimmed = text.trim();
        Self::build(trimmed, trimmed, keep)
    }

    fn build(raw: &str, body: &str, keep: bool) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        let notation = classify(body);
        let matcher = match notation {
            Notation::Package => Matcher::Package(body.replace('.', "/")),
            Notation::Path => path_matcher(body)?,
            Notation::Glob => glob_matcher(body)?,
        };

        Some(Self {
            raw: raw.to_string(),
            keep,
            notation,
            matcher,
        })
    }

    /// The rule text as written, including a leading `!`.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this is a keep rule.
    #[must_use]
    pub fn is_keep(&self) -> bool {
        self.keep
    }

    /// Whether this is a strip (ignore) rule.
    #[must_use]
    pub fn is_ignore(&self) -> bool {
        !self.keep
    }

    /// The notation the rule was classified as.
    #[must_use]
    pub fn notation(&self) -> Notation {
        self.notation
    }

    /// Check whether an archive entry path matches this rule.
    ///
    /// Empty paths never match.
    #[must_use]
    pub fn matches(&self, entry_path: &str) -> bool {
        if entry_path.is_empty() {
            return false;
        }

        match &self.matcher {
            Matcher::Prefix(probe) => contains(probe, entry_path),
            Matcher::Package(probe) => {
                contains(probe, entry_path) || is_class_file_of(probe, entry_path)
            }
            Matcher::Name(name) => contains(name, entry_path) || stem_equals(name, entry_path),
            Matcher::Segment(glob) => {
                segments(entry_path).any(|s| glob.matches_with(s, GLOB_OPTIONS))
            }
            Matcher::Anchored(glob) => {
                let parts: Vec<&str> = segments(entry_path).collect();
                (1..=parts.len()).any(|n| glob.matches_with(&parts[..n].join("/"), GLOB_OPTIONS))
            }
        }
    }
}

impl PartialEq for NamespacePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.keep == other.keep
    }
}

impl Eq for NamespacePattern {}

impl fmt::Display for NamespacePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Check whether any pattern in `patterns` matches `entry_path`.
#[must_use]
pub fn matches_any(patterns: &[NamespacePattern], entry_path: &str) -> bool {
    patterns.iter().any(|p| p.matches(entry_path))
}

fn classify(body: &str) -> Notation {
    if body.contains('*') {
        Notation::Glob
    } else if body.starts_with('/') {
        Notation::Path
    } else if !body.contains('/') && body.contains('.') {
        Notation::Package
    } else {
        Notation::Path
    }
}

fn normalize_path(body: &str) -> Option<&str> {
    let probe = body.strip_prefix('/').unwrap_or(body).trim_end_matches('/');
    (!probe.is_empty()).then_some(probe)
}

/// Absolute rules and rules with a separator only match by prefix.
fn path_matcher(body: &str) -> Option<Matcher> {
    let probe = normalize_path(body)?.to_string();
    if is_bare_name(body) {
        Some(Matcher::Name(probe))
    } else {
        Some(Matcher::Prefix(probe))
    }
}

fn glob_matcher(body: &str) -> Option<Matcher> {
    let anchored = body.contains('/');
    let probe = normalize_path(body)?;

    let source = if anchored {
        probe.to_string()
    } else {
        // Within one segment `**` cannot cross a separator anyway.
        collapse_double_star(probe)
    };

    match Pattern::new(&source) {
        Ok(glob) if anchored => Some(Matcher::Anchored(glob)),
        Ok(glob) => Some(Matcher::Segment(glob)),
        Err(e) => {
            tracing::warn!("Unsupported glob '{}' ({}), matching it as a literal path", body, e);
            Some(Matcher::Prefix(probe.to_string()))
        }
    }
}

fn collapse_double_star(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn contains(probe: &str, entry_path: &str) -> bool {
    entry_path == probe
        || entry_path
            .strip_prefix(probe)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// `com/example/MyClass` names `com/example/MyClass.class` and its inner
/// classes `com/example/MyClass$Inner.class`.
fn is_class_file_of(probe: &str, entry_path: &str) -> bool {
    let Some(rest) = entry_path.strip_prefix(probe) else {
        return false;
    };
    rest == ".class" || (rest.starts_with('$') && rest.ends_with(".class"))
}

fn is_bare_name(body: &str) -> bool {
    !body.contains('/') && !body.contains('.')
}

/// A bare name also matches files of that name anywhere in the archive,
/// ignoring ASCII case and extension (`debug` matches `com/x/Debug.class`).
fn stem_equals(probe: &str, entry_path: &str) -> bool {
    if entry_path.ends_with('/') {
        return false;
    }
    let Some(file_name) = entry_path.rsplit('/').next() else {
        return false;
    };
    let stem = file_name
        .split(['.', '$'])
        .next()
        .unwrap_or(file_name);
    stem.eq_ignore_ascii_case(probe)
}
