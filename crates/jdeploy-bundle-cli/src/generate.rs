//! Bundle generation commands.
//!
//! Drives [`PlatformBundleGenerator`] over a universal publish directory.

use crate::{PackerKind, parse_platform};
use anyhow::{Context, Result};
use jdeploy_bundle::{NpmPacker, Packer, PlatformBundleGenerator, Project, TarballPacker};

/// Load the project at `path` (default: current directory).
pub fn load_project(path: Option<String>) -> Result<Project> {
    let path = path.unwrap_or_else(|| ".".to_string());
    Project::load(&path).with_context(|| format!("Failed to load project from {path}"))
}

/// Run the generate command.
pub fn run(
    project: Option<String>,
    universal: &str,
    output: &str,
    platform: Option<String>,
) -> Result<()> {
    let project = load_project(project)?;
    let generator = PlatformBundleGenerator::new();

    let bundles = match platform {
        Some(platform) => {
            let platform = parse_platform(&platform)?;
            let bundle = generator
                .generate_platform_bundle(&project, universal, output, Some(platform))
                .with_context(|| format!("Failed to generate {platform} bundle"))?;
            vec![bundle]
        }
        None => {
            if !generator.should_generate_platform_bundles(&project) {
                println!(
                    "Platform bundles are not enabled for {}",
                    project.manifest_path().display()
                );
                return Ok(());
            }
            generator
                .generate_platform_bundles(&project, universal, output)
                .context("Failed to generate platform bundles")?
        }
    };

    println!("Generated {} platform bundle(s):", bundles.len());
    for bundle in &bundles {
        println!("  {:<12} {}", bundle.platform.as_str(), bundle.directory.display());
    }

    Ok(())
}

/// Run the tarballs command.
pub fn tarballs(
    project: Option<String>,
    universal: &str,
    output: &str,
    packer: PackerKind,
    exit_on_fail: bool,
) -> Result<()> {
    let project = load_project(project)?;
    let generator = PlatformBundleGenerator::new();

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {output}"))?;

    let packer: Box<dyn Packer> = match packer {
        PackerKind::Npm => Box::new(NpmPacker::default()),
        PackerKind::Builtin => Box::new(TarballPacker),
    };

    let tarballs = generator
        .generate_platform_tarballs(&project, universal, output, packer.as_ref(), exit_on_fail)
        .context("Failed to generate platform tarballs")?;

    if tarballs.is_empty() {
        println!("No platform tarballs generated");
        return Ok(());
    }

    println!("Generated {} platform tarball(s):", tarballs.len());
    for tarball in &tarballs {
        println!("  {:<12} {}", tarball.platform.as_str(), tarball.tarball.display());
    }

    Ok(())
}

/// Run the filter-default command.
pub fn filter_default(project: Option<String>, dir: &str) -> Result<()> {
    let project = load_project(project)?;
    let generator = PlatformBundleGenerator::new();

    if !generator.should_filter_default_bundle(&project) {
        println!("No global .jdpignore file; default bundle left unchanged");
        return Ok(());
    }

    let modified = generator
        .filter_default_bundle(&project, dir)
        .with_context(|| format!("Failed to filter default bundle in {dir}"))?;

    println!("Filtered {modified} jar(s) in {dir}");
    Ok(())
}
