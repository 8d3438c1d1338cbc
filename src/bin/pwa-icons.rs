//! `pwa-icons <source> [target_dir]`: the PWA icon set on its own.

use clap::Parser;
use clap::builder::FalseyValueParser;
use image_tools::{config, icons, logging, output};
use std::path::PathBuf;

/// Generate icon-<n>x<n>.png files for a web app manifest from a logo
#[derive(Parser)]
#[command(name = "pwa-icons", version)]
struct Args {
    /// Logo image
    source: PathBuf,
    /// Output directory (default: config [icons] target_dir)
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
        .unwrap_or_else(|| config.icons.target_dir.clone());
    let report =
        icons::generate_pwa_icons(&args.source, &target_dir, &config.pwa_icon_options(args.force))?;
    output::print_icon_report("PWA icons", &report);
    Ok(())
}
