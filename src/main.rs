mod batch;
mod error;
mod metadata;
mod reader;
mod writer;

use batch::ConvertConfig;
use clap::{Parser, Subcommand};
use metadata::{MetadataDefaults, MetadataOverrides};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ict-report")]
#[command(version, about = "Convert ICT test result files into formatted Excel reports")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Program shown in the report when none is given explicitly
    #[arg(long, global = true, default_value = metadata::DEFAULT_PROGRAM)]
    pub default_program: String,

    /// SMT line shown in the report when none is given explicitly
    #[arg(long, global = true, default_value = metadata::DEFAULT_LINE)]
    pub default_line: String,

    /// Prefix for generated report file names
    #[arg(long, global = true, default_value = batch::DEFAULT_PREFIX)]
    pub prefix: String,

    /// Print detailed progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert every matching file in a directory
    Batch {
        /// Directory holding the ICT result files
        #[arg(short, long, default_value = "TXT Files")]
        input_dir: PathBuf,

        /// Directory for the generated reports
        #[arg(short, long, default_value = "Excel Reports")]
        output_dir: PathBuf,

        /// Input file extension, matched case-insensitively
        #[arg(short, long, default_value = "txt")]
        extension: String,
    },

    /// Convert the given files, optionally with explicit product information
    Convert {
        /// ICT result files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory for the generated reports
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Program name (default: derived)
        #[arg(long)]
        program: Option<String>,

        /// SMT run date (default: from the file name)
        #[arg(long)]
        smt_run: Option<String>,

        /// SMT line (default: derived)
        #[arg(long)]
        smt_line: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> error::Result<()> {
    let today = chrono::Local::now().date_naive();
    let defaults = MetadataDefaults {
        program: args.default_program,
        smt_line: args.default_line,
    };

    let summary = match args.command {
        Command::Batch {
            input_dir,
            output_dir,
            extension,
        } => {
            let config = ConvertConfig {
                prefix: args.prefix,
                defaults,
                ..ConvertConfig::new(output_dir)
            };
            info!(dir = %input_dir.display(), "scanning for .{} files", extension);
            batch::run_batch(&input_dir, &extension, &config, today)?
        }
        Command::Convert {
            files,
            output_dir,
            program,
            smt_run,
            smt_line,
        } => {
            let config = ConvertConfig {
                output_dir,
                prefix: args.prefix,
                defaults,
                overrides: MetadataOverrides {
                    program,
                    smt_run,
                    smt_line,
                },
            };
            batch::run_convert(&files, &config, today)?
        }
    };

    info!(
        processed = summary.processed,
        failed = summary.failed,
        output_dir = %summary.output_dir.display(),
        "batch processing complete"
    );
    Ok(())
}
