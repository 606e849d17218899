//! Advisory native-namespace scanner.
//!
//! Suggests candidate namespaces for `.jdpignore` authoring. Nothing in the
//! bundle pipeline consumes its output.

use crate::BundleResult;
use crate::archive::entry_names;
use std::collections::BTreeSet;
use std::path::Path;

const NATIVE_EXTENSIONS: [&str; 4] = [".dll", ".so", ".dylib", ".jnilib"];
const NATIVE_DIRECTORIES: [&str; 3] = ["native", "jni", "lib"];
const OS_NAMES: [&str; 5] = ["win", "mac", "linux", "darwin", "windows"];
const ARCH_NAMES: [&str; 4] = ["x64", "arm64", "i386", "amd64"];

/// Scan the archive at `path` for likely native namespaces.
///
/// Returns sorted, de-duplicated candidates: `/file.dll` for native files at
/// the root or in shallow custom directories, `/dir/` for shallow directories
/// grouping native files, and dotted packages for native-looking packages.
pub fn scan_for_native_namespaces(path: &Path) -> BundleResult<Vec<String>> {
    let names = entry_names(path)?;
    Ok(native_namespaces_in(names.iter().map(String::as_str)))
}

/// Scan a list of entry paths. See [`scan_for_native_namespaces`].
#[must_use]
pub fn native_namespaces_in<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found = BTreeSet::new();

    for entry in entries {
        if entry.ends_with('/') || !is_native_library_path(entry) {
            continue;
        }

        let directory = entry.rsplit_once('/').map(|(dir, _)| dir);

        if let Some(directory) = directory {
            let namespace = directory.replace('/', ".");
            if is_likely_native_namespace(&namespace) {
                found.insert(namespace);
            }
        }

        if has_native_extension(entry) {
            match directory {
                None => {
                    found.insert(format!("/{entry}"));
                }
                Some(directory) if is_custom_directory(directory) => {
                    found.insert(format!("/{directory}/"));
                }
                Some(_) => {}
            }
        }
    }

    found.into_iter().collect()
}

fn has_native_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    NATIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn is_native_library_path(path: &str) -> bool {
    if has_native_extension(path) {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    let segments: Vec<&str> = lower.split('/').collect();
    let directories = &segments[..segments.len().saturating_sub(1)];
    directories.iter().any(|s| NATIVE_DIRECTORIES.contains(s))
        || (lower.ends_with(".class") && directories.contains(&"native"))
}

fn is_likely_native_namespace(namespace: &str) -> bool {
    let lower = namespace.to_ascii_lowercase();
    let parts: Vec<&str> = lower.split('.').collect();

    parts.iter().any(|p| NATIVE_DIRECTORIES.contains(p))
        || parts
            .windows(2)
            .any(|pair| OS_NAMES.contains(&pair[0]) && ARCH_NAMES.contains(&pair[1]))
}

/// Shallow directories (at most two levels) or directories that mostly do
/// not look like Java package names.
fn is_custom_directory(directory: &str) -> bool {
    let parts: Vec<&str> = directory.split('/').collect();
    if parts.len() <= 2 {
        return true;
    }
    let package_like = parts.iter().filter(|p| is_package_segment(p)).count();
    package_like < parts.len() / 2
}

fn is_package_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
