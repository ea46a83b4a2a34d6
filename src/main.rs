use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webpify::{batch, config, output};

#[derive(Parser)]
#[command(name = "webpify")]
#[command(version)]
#[command(about = "Convert a directory of images to WEBP")]
#[command(long_about = "\
Convert a directory of images to WEBP

Every file in the images directory (except .gitignore) is decoded, optionally
trimmed of a uniform border, shrunk to the configured limits, and written
next to the original as <name>.webp.

Per image, in order:
  1. Trim whitespace   border colored like the top-left pixel (--keep-whitespace to skip)
  2. Dimension limit   larger side capped at -r pixels (off by default)
  3. Area limit        width x height capped at --mp megapixels (always on)
  4. Encode            lossy WEBP at -q quality
  5. Retention         originals kept unless --remove-originals

Run 'webpify gen-config' to print a documented config file.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// WEBP image quality, from 0 to 100 [default: 90]
    #[arg(short = 'q', long)]
    quality: Option<u32>,

    /// Upper bound for any image dimension in pixels; 0 = no limit [default: 0]
    #[arg(short = 'r', long)]
    max_dimension: Option<u32>,

    /// Upper bound for image area in megapixels [default: 64]
    #[arg(long = "mp", visible_alias = "max-megapixels")]
    max_megapixels: Option<u32>,

    /// Do not trim uniform borders
    #[arg(long)]
    keep_whitespace: bool,

    /// Delete originals after conversion (existing .webp inputs are overwritten, never deleted)
    #[arg(long)]
    remove_originals: bool,

    /// Number of parallel workers [default: CPU cores]
    #[arg(long)]
    threads: Option<usize>,

    /// Directory to convert [default: images]
    #[arg(long)]
    dir: Option<PathBuf>,

    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a config file with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> config::ConfigOverrides {
        config::ConfigOverrides {
            images_dir: self.dir.clone(),
            quality: self.quality,
            max_dimension: self.max_dimension,
            max_megapixels: self.max_megapixels,
            keep_whitespace: self.keep_whitespace,
            remove_originals: self.remove_originals,
            threads: self.threads,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::GenConfig) = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    init_tracing(cli.verbose);
    let config = config::load_config(cli.config.as_deref(), &cli.overrides())?;
    tracing::debug!(?config, "effective configuration");

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let result = batch::run(&config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = result?;

    output::print_summary(&summary);
    if !summary.is_success() {
        return Err(format!("{} of {} images failed", summary.failed.len(), summary.total).into());
    }
    Ok(())
}
