use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use multialign::config::MethodKind;

mod check_config;
mod demo;

/// multialign - Multi-sample LC-MS feature alignment.
#[derive(Parser)]
#[command(name = "multialign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Alignment strategy override.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    /// Dendrogram-driven merging.
    Hierarchical,
    /// Merge samples in input order.
    Sequential,
}

impl From<MethodArg> for MethodKind {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Hierarchical => MethodKind::Hierarchical,
            MethodArg::Sequential => MethodKind::Sequential,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Align synthetic multi-sample feature data.
    Demo {
        /// Number of samples to generate.
        #[arg(short = 'n', long, default_value = "5")]
        samples: usize,

        /// Number of underlying compounds.
        #[arg(short = 'f', long, default_value = "200")]
        features: usize,

        /// Seed for the data generator.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// TOML configuration file.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the configured strategy.
        #[arg(short = 'm', long, value_enum)]
        method: Option<MethodArg>,

        /// Extra filters as kind:threshold, applied after configured ones.
        #[arg(long = "filter", value_name = "KIND:THRESHOLD")]
        filters: Vec<String>,

        /// Write a JSON report of the alignment.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Validate a TOML configuration file.
    CheckConfig {
        /// Configuration file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Demo {
            samples,
            features,
            seed,
            config,
            method,
            filters,
            report,
        } => demo::run(demo::DemoArgs {
            samples,
            features,
            seed,
            config,
            method: method.map(MethodKind::from),
            filters,
            report,
        }),
        Commands::CheckConfig { file } => check_config::run(file),
    }
}
