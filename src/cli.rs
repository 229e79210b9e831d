use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::*;

use crate::executor::CommandExecutor;
use crate::tui::types::SubmissionOutcome;

#[derive(Parser, Debug)]
#[command(name = "cockpit", version, about = "Issue commands to a remote execution endpoint")]
pub struct Args {
    /// Configuration file (default: ~/.cockpit/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the execution endpoint
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Reject replies without string `status` and `message` fields
    #[arg(long)]
    pub strict: bool,

    /// Log filter directive
    #[arg(long)]
    pub log_level: Option<String>,

    /// Extra config overrides as key=value
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Submit a single command without opening the form
    #[arg(long, value_name = "COMMAND")]
    pub once: Option<String>,
}

impl Args {
    /// Flag values expressed as config overrides, applied after `--set` ones.
    pub fn flag_overrides(&self) -> Vec<(String, String)> {
        let mut overrides = Vec::new();
        if let Some(endpoint) = &self.endpoint {
            overrides.push(("base_url".to_string(), endpoint.clone()));
        }
        if self.strict {
            overrides.push(("schema".to_string(), "strict".to_string()));
        }
        if let Some(level) = &self.log_level {
            overrides.push(("log_level".to_string(), level.clone()));
        }
        overrides
    }
}

/// Performs one submission and prints its outcome.
pub async fn run_once(executor: Arc<dyn CommandExecutor>, command: &str) -> ExitCode {
    println!("{} {}", "Endpoint:".dimmed(), executor.target().cyan());
    println!("{} {}", "Command:".dimmed(), command.bright_white());

    let outcome = SubmissionOutcome::from_reply(executor.execute(command).await);

    println!("{}", format_outcome(&outcome));

    match outcome {
        SubmissionOutcome::TransportError { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn format_outcome(outcome: &SubmissionOutcome) -> String {
    let message = outcome.message();
    match outcome.category() {
        Some("ok") => format!("{} {}", "[ok]".green().bold(), message),
        Some("error") => format!("{} {}", "[error]".red().bold(), message),
        Some(other) => format!("{} {}", format!("[{}]", other).yellow().bold(), message),
        None if outcome.is_none() => "(no response)".dimmed().to_string(),
        None => message.to_string(),
    }
}
