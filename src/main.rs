//! # multialign
//!
//! Command-line front end for the alignment engine.
//!
//! ## Usage
//!
//! ```bash
//! # Align synthetic samples and print a summary
//! multialign demo --samples 6 --features 300
//!
//! # Same, with a config file and a JSON report
//! multialign -v demo --config multialign.toml --report report.json
//!
//! # Check a configuration file
//! multialign check-config multialign.toml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
