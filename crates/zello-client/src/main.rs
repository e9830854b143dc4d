//! zello CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use zello_client::cli::{Cli, Command, ConfigAction};
use zello_client::commands;
use zello_client::config::ClientConfig;
use zello_client::error::{ClientError, ClientResult};
use zello_core::{TracingConfig, TracingOutputFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default().with_level(tracing::Level::WARN)
    };
    let tracing_config = if cli.json_logs {
        tracing_config.with_format(TracingOutputFormat::Json)
    } else {
        tracing_config
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    // Run the command
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };
    let url = cli.server.clone().unwrap_or_else(|| config.server.url.clone());

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Command::Say { text, account, to } => {
            commands::say::run(&config, &url, account, &text, to.as_deref()).await
        }
        Command::Listen { seconds, account } => {
            commands::listen::run(&config, &url, account, seconds).await
        }
    }
}
