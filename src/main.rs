use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod error;
mod executor;
mod logging;
mod protocol;
mod tui;

use cli::Args;
use executor::{CommandExecutor, HttpExecutor};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = config::load_or_create_config(args.config.as_deref())?;
    let mut overrides = args
        .overrides
        .iter()
        .map(|raw| config::parse_override(raw))
        .collect::<Result<Vec<_>>>()?;
    overrides.extend(args.flag_overrides());
    config.merge_overrides(overrides)?;

    logging::init(&config.logging, args.once.is_none())?;
    info!(
        endpoint = %config.endpoint.base_url,
        schema = %config.endpoint.response_schema,
        timeout = config.endpoint.timeout_seconds,
        "cockpit starting"
    );

    let executor: Arc<dyn CommandExecutor> = Arc::new(HttpExecutor::from_config(&config.endpoint)?);

    if let Some(command) = args.once.as_deref() {
        return Ok(cli::run_once(executor, command).await);
    }

    tui::run_tui(executor, &config.tui).await?;
    Ok(ExitCode::SUCCESS)
}
