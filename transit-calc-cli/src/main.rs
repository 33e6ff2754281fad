//! Command line entry point: reads a commute request body and prints the monthly commute response.

mod config;

use std::io::stderr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::fs;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use transit_calc_core::service::TransitCalcService;
use transit_calc_provider_table::TableDurationPort;

use crate::config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let port = TableDurationPort::from_path(&cli.table)
        .with_context(|| format!("loading travel time table {}", cli.table.display()))?;
    let service = TransitCalcService::new(Arc::new(port), cli.commute_options());
    debug!(options = ?service.options(), "service ready");

    let body = read_request(cli.request_path()).await?;
    let response = service.handle_body(&body).await?;

    // stdout carries only the response body; logs go to stderr
    let mut stdout = io::stdout();
    stdout.write_all(response.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(stderr)
        .init();
}

async fn read_request(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .await
            .with_context(|| format!("reading request {}", path.display())),
        None => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .await
                .context("reading request from stdin")?;
            Ok(body)
        }
    }
}
