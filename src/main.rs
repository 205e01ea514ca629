use clap::{Parser, Subcommand};
use photo_squeeze::batch::{self, BatchReport};
use photo_squeeze::config::{self, Config};
use photo_squeeze::output;
use photo_squeeze::sources::{DirectorySink, DirectorySource, DryRunSink};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "photo-squeeze")]
#[command(about = "Shrink record photos under a hard byte ceiling")]
#[command(long_about = "\
Shrink record photos under a hard byte ceiling

Every photo is decoded (JPEG or PNG, whatever the file claims to be) and
re-encoded as JPEG at a fixed quality. If that is still over the ceiling it
is downscaled once into the bounding box and encoded again. Photos that are
still too large are reported, never uploaded.

Input layout:

  photos/
  ├── S1001.jpg          # record S1001
  ├── S1002.png          # PNG is fine, output is always JPEG
  └── S1003.jpeg

Logging goes to stderr and honours RUST_LOG (default: info).

Run 'photo-squeeze gen-config' to generate a documented photo-squeeze.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress every photo in a directory
    Compress {
        /// Directory of source photos, one file per record
        #[arg(long)]
        input: PathBuf,

        /// Directory that receives accepted JPEGs
        #[arg(long)]
        output: PathBuf,

        /// Write the per-record batch report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Run the pipeline without writing any output photos
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a CSV of large source photos and how they compress
    Report {
        /// Directory of source photos, one file per record
        #[arg(long)]
        input: PathBuf,

        /// Minimum original size in bytes (overrides the config value)
        #[arg(long)]
        threshold: Option<usize>,
    },
    /// Print a stock photo-squeeze.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Compress {
            input,
            output: output_dir,
            report,
            dry_run,
        } => {
            let config = config::load_config(&cli.config)?;
            let result = if dry_run {
                run_with_progress(&input, &DryRunSink, &config)?
            } else {
                run_with_progress(&input, &DirectorySink::new(&output_dir), &config)?
            };
            output::print_summary(&result);
            if let Some(path) = report {
                result.write_json(&path)?;
                println!("Report: {}", path.display());
            }
        }
        Command::Report { input, threshold } => {
            let config = config::load_config(&cli.config)?;
            let source = DirectorySource::open(&input)?;
            let result = batch::run_batch(&source.ids(), &source, &DryRunSink, &config, None)?;
            let threshold = threshold.unwrap_or(config.report.large_photo_threshold_bytes);
            output::print_size_report(&result, threshold);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Run a batch over `input`, streaming progress lines from a printer thread.
fn run_with_progress(
    input: &Path,
    sink: &impl photo_squeeze::sources::PhotoSink,
    config: &Config,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let source = DirectorySource::open(input)?;
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = batch::run_batch(&source.ids(), &source, sink, config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    Ok(result?)
}

/// Structured logs to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
