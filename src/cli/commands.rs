use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::design::load_design;
use crate::generator::{Generator, GeneratorOptions, NoFormat, Rustfmt, DEFAULT_RUNTIME_CRATE};
use crate::naming::DEFAULT_TARGET;
use crate::version::check_version;

/// Command-line interface for bootgen
#[derive(Parser)]
#[command(name = "bootgen")]
#[command(about = "Scaffold a service from an API design", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate main.rs and controller stubs from a design
    Bootstrap {
        /// Output directory for the generated files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Path to the design document (YAML or JSON)
        #[arg(short, long)]
        design: PathBuf,

        /// Module the generated types live in
        #[arg(long, default_value = DEFAULT_TARGET)]
        pkg: String,

        /// Version of the invoking tool
        #[arg(long)]
        version: Option<String>,

        /// Delete and regenerate existing files
        #[arg(short, long, default_value_t = false)]
        force: bool,

        /// Ignored; accepted for compatibility with meta generators
        #[arg(long, default_value_t = false)]
        notest: bool,

        /// Design marker written into main.rs (defaults to the design path)
        #[arg(long)]
        design_pkg: Option<String>,

        /// Runtime crate the generated code is written against
        #[arg(long, default_value = DEFAULT_RUNTIME_CRATE)]
        runtime_crate: String,

        /// Do not run rustfmt on generated files
        #[arg(long, default_value_t = false)]
        no_fmt: bool,
    },
}

/// Install the stderr `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute a parsed command, returning the files it created
///
/// # Errors
///
/// Returns an error if:
/// - The tool version is incompatible (nothing is read or written)
/// - The design document cannot be loaded
/// - Generation fails (files created so far are rolled back)
pub fn run_cli(cli: Cli) -> anyhow::Result<Vec<PathBuf>> {
    match cli.command {
        Commands::Bootstrap {
            out,
            design,
            pkg,
            version,
            force,
            notest: _,
            design_pkg,
            runtime_crate,
            no_fmt,
        } => {
            if let Some(version) = version.as_deref() {
                check_version(version)?;
            }
            let api = load_design(&design)
                .with_context(|| format!("Failed to load design {design:?}"))?;
            let options = GeneratorOptions {
                out_dir: out,
                design_pkg: design_pkg.unwrap_or_else(|| design.to_string_lossy().into_owned()),
                target: pkg,
                force,
                runtime_crate,
            };
            let generator = Generator::new(api, options).watch_signals(true);
            let generator = if no_fmt {
                generator.with_formatter(NoFormat)
            } else {
                generator.with_formatter(Rustfmt::from_env())
            };
            Ok(generator.generate()?)
        }
    }
}
