//! Single-jar commands.

use crate::parse_platform;
use anyhow::{Context, Result};
use jdeploy_bundle::archive;
use jdeploy_bundle::scanner::scan_for_native_namespaces;
use std::path::Path;

/// Run the filter command.
///
/// Rewrites `jar` in place, or writes a platform-suffixed copy when
/// `platform` is given.
pub fn filter(
    jar: &str,
    strip: &[String],
    keep: &[String],
    platform: Option<String>,
) -> Result<()> {
    let path = Path::new(jar);

    if let Some(platform) = platform {
        let platform = parse_platform(&platform)?;
        let copy = archive::create_platform_specific_archive(path, Some(platform), strip, keep)
            .with_context(|| format!("Failed to create {platform} copy of {jar}"))?;
        println!("Created {}", copy.display());
        return Ok(());
    }

    let summary = archive::process_archive_for_platform(path, strip, keep)
        .with_context(|| format!("Failed to filter {jar}"))?;

    if summary.is_modified() {
        println!(
            "Removed {} entries from {jar} ({} retained)",
            summary.removed, summary.retained
        );
    } else {
        println!("{jar} unchanged");
    }

    Ok(())
}

/// Run the scan command.
pub fn scan(jar: &str) -> Result<()> {
    let namespaces = scan_for_native_namespaces(Path::new(jar))
        .with_context(|| format!("Failed to scan {jar}"))?;

    if namespaces.is_empty() {
        println!("No native namespaces found in {jar}");
        return Ok(());
    }

    for namespace in namespaces {
        println!("{namespace}");
    }

    Ok(())
}
