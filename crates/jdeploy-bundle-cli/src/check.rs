//! Rule inspection commands.

use crate::generate::load_project;
use crate::parse_platform;
use anyhow::Result;
use jdeploy_bundle::recommended::recommended_rules;
use jdeploy_bundle::{IgnoreService, Platform, PlatformBundleGenerator};

/// Run the check command.
///
/// Prints the generation decisions and the strip/keep lists each target
/// platform resolves to.
pub fn run(project: Option<String>, platform: Option<String>) -> Result<()> {
    let project = load_project(project)?;
    let generator = PlatformBundleGenerator::new();
    let mut ignore_service = IgnoreService::new();

    let name = project.package_name()?;
    println!("Project: {name} v{}", project.version());
    println!(
        "  Platform bundles enabled: {}",
        project.is_platform_bundles_enabled()
    );
    println!(
        "  Generates platform bundles: {}",
        generator.should_generate_platform_bundles(&project)
    );
    println!(
        "  Filters default bundle: {}",
        generator.should_filter_default_bundle(&project)
    );

    let platforms = match platform {
        Some(platform) => vec![parse_platform(&platform)?],
        None => generator.platforms_for_bundle_generation(&project),
    };

    let stats = ignore_service.pattern_statistics(&project, None);
    println!(
        "  Global ignore patterns: {} ({} keep, {} ignore)",
        stats.global.total, stats.global.keep, stats.global.ignore
    );

    for platform in platforms {
        println!();
        println!("{} ({})", platform.as_str(), platform.display_name());

        if let Some(name) = project.platform_package_name(platform) {
            println!("  Package name: {name}");
        }

        let strip = generator.namespaces_to_strip(&project, platform);
        let keep = generator.namespaces_to_keep(&project, platform);
        println!("  Strip: {}", list(&strip));
        println!("  Keep:  {}", list(&keep));

        if let Some(counts) = ignore_service
            .pattern_statistics(&project, Some(platform))
            .platform
        {
            println!(
                "  Platform ignore patterns: {} ({} keep, {} ignore)",
                counts.counts.total, counts.counts.keep, counts.counts.ignore
            );
        }
    }

    Ok(())
}

/// Run the recommend command.
pub fn recommend(platform: &str) -> Result<()> {
    let platform: Platform = parse_platform(platform)?;
    print!("{}", recommended_rules(platform));
    Ok(())
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}
