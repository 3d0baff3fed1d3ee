use clap::{Parser, Subcommand};
use midia_resolve::archive::ArchiveError;
use midia_resolve::config::{self, CompressConfig};
use midia_resolve::imaging::CompressionLevel;
use midia_resolve::process::{self, ProcessError, ProcessOptions};
use midia_resolve::{output, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "midia-resolve")]
#[command(about = "Batch image compressor: resize, crop and re-encode photos")]
#[command(long_about = "\
Batch image compressor: resize, crop and re-encode photos

Every input is decoded, resized (uniform scale or explicit width x height),
center-cropped when the requested aspect ratio differs from the source, and
re-encoded as JPEG at the chosen tier:

  low     quality 0.9   (PNG input stays PNG if nothing else changes)
  medium  quality 0.7
  high    quality 0.5

Camera EXIF is copied into JPEG output, minus orientation and pixel
dimensions. One bad file never stops the batch; failures are listed in the
summary and in report.json.

Run 'midia-resolve gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Log pipeline diagnostics (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags for the compress command. Anything given here overrides config.toml.
#[derive(clap::Args)]
struct CompressArgs {
    /// Image files and/or directories to compress
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Compression tier
    #[arg(long, value_enum)]
    level: Option<CompressionLevel>,

    /// Uniform scale percentage, used when no explicit size is given
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    scale: Option<u32>,

    /// Target width in pixels (needs --height)
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels (needs --width)
    #[arg(long)]
    height: Option<u32>,

    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also bundle all outputs into a ZIP archive
    #[arg(long)]
    zip: bool,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Do not copy EXIF into the output
    #[arg(long)]
    no_exif: bool,

    /// No per-file progress; list all results once the batch is done
    #[arg(long, short)]
    quiet: bool,

    /// Config file (default: ./config.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images
    Compress(CompressArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compress(args) => compress(args)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config.toml and lay the command-line flags over it.
fn resolve_settings(args: &CompressArgs) -> Result<CompressConfig, Box<dyn std::error::Error>> {
    let path = match &args.config {
        Some(path) if !path.exists() => {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        Some(path) => path.clone(),
        None => PathBuf::from("config.toml"),
    };
    let mut settings = config::load_config(&path)?;

    if let Some(level) = args.level {
        settings.compression.level = level;
    }
    if let Some(scale) = args.scale {
        settings.resize.scale = scale;
    }
    if args.width.is_some() {
        settings.resize.width = args.width;
    }
    if args.height.is_some() {
        settings.resize.height = args.height;
    }
    if let Some(dir) = &args.out_dir {
        settings.output.dir = dir.display().to_string();
    }
    if args.no_exif {
        settings.metadata.preserve = false;
    }
    settings.validate()?;
    Ok(settings)
}

fn compress(args: CompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = resolve_settings(&args)?;

    let scanned = scan::scan(&args.paths, args.recursive)?;
    output::print_skipped(&scanned.skipped);

    let options = ProcessOptions {
        request: settings.transform_request(),
        preserve_metadata: settings.metadata.preserve,
        prefix: settings.output.prefix.clone(),
    };

    let mut outcome = if args.quiet {
        let outcome = process::process_batch(&scanned.inputs, &options, None);
        output::print_results(&outcome);
        outcome
    } else {
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                for line in output::format_process_event(&event) {
                    println!("{}", line);
                }
            }
        });
        let outcome = process::process_batch(&scanned.inputs, &options, Some(tx));
        printer
            .join()
            .map_err(|_| "progress printer thread panicked")?;
        outcome
    };

    if outcome.summary.total > 0 {
        let out_dir = Path::new(&settings.output.dir);
        let report = process::write_outputs(&mut outcome, out_dir)?;
        println!();
        println!("Report: {}", report.display());

        if args.zip {
            let archive_path = out_dir.join(&settings.output.archive_name);
            match outcome.write_archive(&archive_path) {
                Ok(count) => println!("{}", output::format_archive_written(&archive_path, count)),
                Err(ProcessError::Archive(e @ ArchiveError::NoFilesToArchive)) => {
                    eprintln!("{}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    output::print_summary(&outcome);
    Ok(())
}
