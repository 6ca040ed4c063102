//! fitnessgram2pfai CLI - Convert a FitnessGram Data Export to PFAI format
//!
//! ```bash
//! fitnessgram2pfai --in export.csv --out pfai.csv
//! fitnessgram2pfai --in export.csv --merge merge.csv --warn --out pfai.csv
//! ```

use clap::{ArgAction, Parser};
use pfai::logging::{init_logging, LogConfig};
use pfai::source::DEFAULT_SOURCE_ENCODING;
use pfai::{convert, ConvertOptions};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

/// Exit status for every fatal I/O failure.
const EXIT_FAILURE: i32 = -1;

#[derive(Parser)]
#[command(name = "fitnessgram2pfai")]
#[command(about = "Convert Fitnessgram Export to PFAI Format", long_about = None)]
struct Cli {
    /// Input "Fitnessgram Data Export" file path
    #[arg(short = 'i', long = "in", value_name = "input.csv")]
    input: PathBuf,

    /// Path to merge.csv
    #[arg(short, long, value_name = "merge.csv")]
    merge: Option<PathBuf>,

    /// Log any validation issues to stdout
    #[arg(short, long)]
    warn: bool,

    /// Output PFAI.csv file path
    #[arg(short, long, value_name = "output.csv")]
    out: PathBuf,

    /// Encoding of the export (`auto` to detect)
    #[arg(long, env = "PFAI_SOURCE_ENCODING", default_value = DEFAULT_SOURCE_ENCODING)]
    encoding: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_timestamps(cli.verbose > 1)
            .with_ansi(io::stderr().is_terminal()),
    );

    let mut options = ConvertOptions::new(cli.input, cli.out)
        .with_warnings(cli.warn)
        .with_echo(true)
        .with_encoding(cli.encoding);
    if let Some(merge) = cli.merge {
        options = options.with_merge(merge);
    }

    if let Err(e) = convert(&options) {
        eprintln!("{}", e);
        std::process::exit(EXIT_FAILURE);
    }
}
