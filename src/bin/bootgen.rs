use bootgen::cli::{init_logging, run_cli, Cli};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    init_logging();
    let files = run_cli(Cli::parse())?;
    if files.is_empty() {
        println!("ℹ️  Nothing to generate (existing files kept, use --force to overwrite)");
    }
    for file in files {
        println!("✅ Generated {}", file.display());
    }
    Ok(())
}
