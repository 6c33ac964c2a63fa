mod app;
mod cli;

use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Config};

// Usage: regex-render [-t html] <pattern>...  or  echo <pattern> | regex-render
fn main() {
    let cli = Cli::parse();

    let filter = match cli.log_level {
        Some(level) => EnvFilter::new(level.as_filter()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cfg = Config::from(cli);
    let code = match app::run(&cfg, io::stdin().lock(), io::stdout().lock(), io::stderr()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    process::exit(code);
}
