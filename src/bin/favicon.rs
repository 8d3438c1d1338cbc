//! `favicon <source> [target_dir]`: the favicon set on its own.

use clap::Parser;
use clap::builder::FalseyValueParser;
use image_tools::{config, icons, logging, output};
use std::path::PathBuf;

/// Generate favicon PNGs, an Apple touch icon and favicon.ico from a logo
#[derive(Parser)]
#[command(name = "favicon", version)]
struct Args {
    /// Logo image
    source: PathBuf,
    /// Output directory (default: config [favicon] target_dir)
    target_dir: Option<PathBuf>,
    /// Overwrite existing icons
    #[arg(long, short)]
    force: bool,
    /// Config file (default: ./image-tools.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log planning and skip decisions to stderr
    #[arg(
        long,
        short,
        env = "IMAGE_TOOLS_VERBOSE",
        value_parser = FalseyValueParser::new()
    )]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let config = config::load_config(args.config.as_deref(), &std::env::current_dir()?)?;
    let target_dir = args
        .target_dir
        .unwrap_or_else(|| config.favicon.target_dir.clone());
    let report =
        icons::generate_favicons(&args.source, &target_dir, &config.favicon_options(args.force))?;
    output::print_icon_report("Favicons", &report);
    Ok(())
}
