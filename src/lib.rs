pub mod aggregate;
pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod filter;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod report;
pub mod sample;
pub mod schema;
pub mod schema_cmd;
pub mod session;
pub mod table;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("critical_parts", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Dashboard(args) => report::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Export(args) => export::execute(&args),
        Commands::Schema(args) => schema_cmd::execute(&args),
    }
}
