use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use image_tools::batch::{self, BatchOptions};
use image_tools::config::{self, ToolsConfig};
use image_tools::convert::{self, ConvertOptions, FormatFilter, SizeFilter};
use image_tools::imaging::Quality;
use image_tools::{icons, logging, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Flags shared by `convert` and `batch`.
#[derive(clap::Args, Clone)]
struct ConvertArgs {
    /// Output directory (default: config target_dir, else next to the source)
    #[arg(long, short, env = "IMAGE_TOOLS_OUT_DIR")]
    out: Option<PathBuf>,

    /// Use this profile for every image instead of detecting one
    #[arg(long, short)]
    profile: Option<String>,

    /// Override the profile's WebP and original-format quality (1-100)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Overwrite outputs that already exist
    #[arg(long, short)]
    force: bool,

    /// Pick profiles from file names (default from config)
    #[arg(long, overrides_with = "no_smart")]
    smart: bool,

    /// Use the default profile unless --profile is given
    #[arg(long = "no-smart", overrides_with = "smart")]
    no_smart: bool,

    /// Responsive sizes to generate: `all` or a list like `sm,md`
    #[arg(long, default_value = "all")]
    sizes: SizeFilter,

    /// Output families to generate: `all`, `webp`, `original`
    #[arg(long, default_value = "all")]
    formats: FormatFilter,

    /// Recurse into subdirectories (directory sources only)
    #[arg(long, short)]
    recursive: bool,

    /// Write a JSON summary to this path (directory sources only)
    #[arg(long)]
    report: Option<PathBuf>,
}

impl ConvertArgs {
    fn convert_options(&self, config: &ToolsConfig) -> ConvertOptions {
        let smart = if self.no_smart {
            false
        } else {
            self.smart || config.smart
        };
        ConvertOptions {
            profile: self.profile.clone(),
            smart,
            quality: self.quality,
            force: self.force || config.force,
            sizes: self.sizes.clone(),
            formats: self.formats,
        }
    }
}

#[derive(Parser)]
#[command(name = "image-tools")]
#[command(about = "Optimize website images: WebP, responsive variants, placeholders, icons")]
#[command(long_about = "\
Optimize website images: WebP, responsive variants, placeholders, icons

Each source image gets a full-size WebP, a WebP and a same-format copy per
responsive size, and a blurred placeholder:

  hero_main.jpg
  ├── hero_main.webp
  ├── hero_main_sm.webp, hero_main_sm.jpg
  ├── hero_main_md.webp, hero_main_md.jpg
  └── hero_main_placeholder.webp, hero_main_placeholder.jpg

Sizes come from a profile. With smart mode (the default) the profile is
picked from the file name: hero/banner/cover → hero, team/avatar → teamMember,
product → product, thumb → thumbnail, blog/article → blogImage,
icon/logo → icon, anything else → default.

Existing outputs are never rewritten without --force, so runs are cheap to
repeat.

Run 'image-tools gen-config' to generate a documented image-tools.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./image-tools.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile used when neither --profile nor smart mode picks one
    #[arg(long, global = true, env = "IMAGE_TOOLS_DEFAULT_PROFILE")]
    default_profile: Option<String>,

    /// Log planning and skip decisions to stderr
    #[arg(
        long,
        short,
        global = true,
        env = "IMAGE_TOOLS_VERBOSE",
        value_parser = FalseyValueParser::new()
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one image to a full-size WebP
    Webp {
        source: PathBuf,
        /// Output directory (default: next to the source)
        #[arg(long, short, env = "IMAGE_TOOLS_OUT_DIR")]
        out: Option<PathBuf>,
        /// WebP quality (default: config webp_quality)
        #[arg(
            long,
            short,
            env = "IMAGE_TOOLS_QUALITY",
            value_parser = clap::value_parser!(u32).range(1..=100)
        )]
        quality: Option<u32>,
        /// Overwrite an existing output
        #[arg(long, short)]
        force: bool,
    },
    /// Generate all profile outputs for an image (or every image in a directory)
    Convert {
        source: PathBuf,
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Convert every image in a directory
    Batch {
        /// Source directory (default: config source_dir)
        dir: Option<PathBuf>,
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Generate favicon PNGs and favicon.ico from a logo
    Favicon {
        source: PathBuf,
        /// Output directory (default: config [favicon] target_dir)
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long, short)]
        force: bool,
    },
    /// Generate PWA icons from a logo
    Icons {
        source: PathBuf,
        /// Output directory (default: config [icons] target_dir)
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long, short)]
        force: bool,
    },
    /// List conversion profiles and icon sets
    ListProfiles,
    /// Print a stock image-tools.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let cwd = std::env::current_dir()?;
    let mut config = config::load_config(cli.config.as_deref(), &cwd)?;
    if let Some(name) = cli.default_profile {
        config.default_profile = name;
        config.validate()?;
    }

    match cli.command {
        Command::Webp {
            source,
            out,
            quality,
            force,
        } => {
            let out = out.or_else(|| config.target_dir.clone());
            let quality = Quality::new(quality.unwrap_or(config.webp_quality));
            let report =
                convert::convert_to_webp(&source, out.as_deref(), quality, force || config.force)?;
            output::print_webp_report(&report);
        }
        Command::Convert { source, args } => {
            if source.is_dir() {
                return run_batch(&source, &args, &config);
            }
            let registry = config.registry()?;
            let out = output_dir(args.out.clone(), &config, source_parent(&source));
            let report = convert::convert_image(
                &source,
                &out,
                &registry,
                &args.convert_options(&config),
            )?;
            output::print_convert_report(&report);
        }
        Command::Batch { dir, args } => {
            let dir = dir.unwrap_or_else(|| config.source_dir.clone());
            return run_batch(&dir, &args, &config);
        }
        Command::Favicon { source, out, force } => {
            let out = out.unwrap_or_else(|| config.favicon.target_dir.clone());
            let report = icons::generate_favicons(&source, &out, &config.favicon_options(force))?;
            output::print_icon_report("Favicons", &report);
        }
        Command::Icons { source, out, force } => {
            let out = out.unwrap_or_else(|| config.icons.target_dir.clone());
            let report =
                icons::generate_pwa_icons(&source, &out, &config.pwa_icon_options(force))?;
            output::print_icon_report("PWA icons", &report);
        }
        Command::ListProfiles => {
            let registry = config.registry()?;
            output::print_profiles(&registry, &config.favicon.ico_sizes, &config.icons.sizes);
        }
        // Printed before config loading.
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Directory holding `source`, `.` for bare file names.
fn source_parent(source: &Path) -> &Path {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `--out` (or `IMAGE_TOOLS_OUT_DIR`) > config `target_dir` > `fallback`.
fn output_dir(cli_out: Option<PathBuf>, config: &ToolsConfig, fallback: &Path) -> PathBuf {
    cli_out
        .or_else(|| config.target_dir.clone())
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// Convert a directory, printing progress from a separate thread.
///
/// Exits with failure when any file (or directory) could not be processed.
fn run_batch(
    source_dir: &Path,
    args: &ConvertArgs,
    config: &ToolsConfig,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let registry = config.registry()?;
    let out = output_dir(args.out.clone(), config, source_dir);
    let options = BatchOptions {
        convert: args.convert_options(config),
        recursive: args.recursive || config.recursive,
        extensions: config.extensions.clone(),
    };

    println!("==> Converting {} → {}", source_dir.display(), out.display());
    let (tx, rx) = std::sync::mpsc::channel();
    let root = source_dir.to_path_buf();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event, &root) {
                println!("{}", line);
            }
        }
    });
    let result = batch::process_directory(source_dir, &out, &registry, &options, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = result?;

    println!();
    output::print_batch_summary(&summary, source_dir);
    if let Some(path) = &args.report {
        batch::write_report(&summary, path)?;
        println!("Report: {}", path.display());
    }

    Ok(if summary.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
