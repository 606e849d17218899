//! jdeploy-bundle CLI - Platform bundle generation for jDeploy packages
//!
//! Commands:
//! - `jdeploy-bundle generate` - Generate platform bundles from a universal bundle
//! - `jdeploy-bundle tarballs` - Generate and pack platform bundles
//! - `jdeploy-bundle filter-default` - Apply global ignore rules to the default bundle
//! - `jdeploy-bundle filter` - Strip namespaces from a single jar
//! - `jdeploy-bundle scan` - Suggest native namespaces found in a jar
//! - `jdeploy-bundle recommend` - Print recommended ignore rules for a platform
//! - `jdeploy-bundle check` - Show the rules a project resolves to
//! - `jdeploy-bundle sign` / `verify` - Sign or verify a bundle directory

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod archive;
mod check;
mod generate;
mod sign;

#[derive(Parser)]
#[command(name = "jdeploy-bundle")]
#[command(author, version, long_about = None)]
#[command(about = "Platform bundle generator for jDeploy packages")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Packer used by the `tarballs` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PackerKind {
    /// Run `npm pack`
    Npm,
    /// Built-in tar.gz writer
    Builtin,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate platform bundles from a universal publish directory
    Generate {
        /// Path to the project directory or its package.json (default: current directory)
        #[arg(short, long)]
        project: Option<String>,

        /// Universal publish directory
        #[arg(short, long)]
        universal: String,

        /// Directory receiving the platform bundles
        #[arg(short, long)]
        output: String,

        /// Generate a single platform (e.g., mac-arm64)
        #[arg(long)]
        platform: Option<String>,
    },

    /// Generate platform bundles and pack each one into a tarball
    Tarballs {
        /// Path to the project directory or its package.json (default: current directory)
        #[arg(short, long)]
        project: Option<String>,

        /// Universal publish directory
        #[arg(short, long)]
        universal: String,

        /// Directory receiving the tarballs
        #[arg(short, long)]
        output: String,

        /// Packer implementation
        #[arg(long, value_enum, default_value = "npm")]
        packer: PackerKind,

        /// Abort on the first packing failure
        #[arg(long)]
        exit_on_fail: bool,
    },

    /// Apply global ignore rules to the jars of the default bundle
    FilterDefault {
        /// Path to the project directory or its package.json (default: current directory)
        #[arg(short, long)]
        project: Option<String>,

        /// Default bundle directory
        dir: String,
    },

    /// Strip namespaces from a jar
    Filter {
        /// Jar file to rewrite
        jar: String,

        /// Namespace to strip (repeatable)
        #[arg(short, long)]
        strip: Vec<String>,

        /// Namespace to keep even when stripped (repeatable)
        #[arg(short, long)]
        keep: Vec<String>,

        /// Write a platform-suffixed copy instead of rewriting in place
        #[arg(long)]
        platform: Option<String>,
    },

    /// Suggest native namespaces found in a jar
    Scan {
        /// Jar file to scan
        jar: String,
    },

    /// Print recommended ignore rules for a platform
    Recommend {
        /// Target platform (e.g., win-x64, or default for global rules)
        platform: String,
    },

    /// Show how a project's rules resolve
    Check {
        /// Path to the project directory or its package.json (default: current directory)
        #[arg(short, long)]
        project: Option<String>,

        /// Limit the report to one platform
        #[arg(long)]
        platform: Option<String>,
    },

    /// Sign the files of a bundle directory
    Sign {
        /// Bundle directory
        dir: String,

        /// Version the signatures are bound to
        #[arg(long)]
        version: String,
    },

    /// Verify the signatures of a bundle directory
    Verify {
        /// Bundle directory
        dir: String,

        /// Version the signatures are bound to
        #[arg(long)]
        version: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            project,
            universal,
            output,
            platform,
        } => {
            generate::run(project, &universal, &output, platform)?;
        }
        Commands::Tarballs {
            project,
            universal,
            output,
            packer,
            exit_on_fail,
        } => {
            generate::tarballs(project, &universal, &output, packer, exit_on_fail)?;
        }
        Commands::FilterDefault { project, dir } => {
            generate::filter_default(project, &dir)?;
        }
        Commands::Filter {
            jar,
            strip,
            keep,
            platform,
        } => {
            archive::filter(&jar, &strip, &keep, platform)?;
        }
        Commands::Scan { jar } => {
            archive::scan(&jar)?;
        }
        Commands::Recommend { platform } => {
            check::recommend(&platform)?;
        }
        Commands::Check { project, platform } => {
            check::run(project, platform)?;
        }
        Commands::Sign { dir, version } => {
            sign::sign(&dir, &version)?;
        }
        Commands::Verify { dir, version } => {
            sign::verify(&dir, &version)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse a platform identifier, rejecting unknown names.
pub fn parse_platform(value: &str) -> anyhow::Result<jdeploy_bundle::Platform> {
    jdeploy_bundle::Platform::parse(value).ok_or_else(|| {
        let known = jdeploy_bundle::Platform::all()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::anyhow!("Unknown platform: {value} (expected one of: {known}, default)")
    })
}
