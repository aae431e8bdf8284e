//! Digit SVC command line interface
//!
//! Trains an RBF support vector classifier on the bundled digits dataset and
//! prints test-set accuracy, sample predictions and a classification report.

use clap::Parser;
use env_logger::Env;
use log::error;
use std::io::{self, Write};
use std::process;

#[derive(Parser)]
#[command(name = "digit-svc")]
#[command(about = "Classify handwritten digits with a support vector machine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(&cli) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> digit_svc::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        let summary = digit_svc::pipeline::run(&mut io::sink())?;
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    } else {
        let summary = digit_svc::pipeline::run(&mut out)?;
        writeln!(out)?;
        summary.render(&mut out)?;
    }

    Ok(())
}
