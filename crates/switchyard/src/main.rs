// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchyard - multi-provider text generation with ordered fallback.
//!
//! This is the binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use switchyard::Runtime;
use switchyard::commands::{self, GenerateOptions};
use switchyard::serve;
use switchyard_config::SwitchyardConfig;
use switchyard_core::{ReasoningEffort, SwitchyardError};
use tracing::error;

/// Switchyard - multi-provider text generation with ordered fallback.
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Generate text for one prompt and print it.
    Generate {
        prompt: String,
        /// Routing profile or provider alias (e.g. "cloud-first", "local").
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        web_search: bool,
        #[arg(long)]
        deep_research: bool,
        /// Reasoning effort: low, medium or high.
        #[arg(long, default_value = "medium")]
        effort: ReasoningEffort,
        /// Caller identity recorded in usage rows.
        #[arg(long, default_value = "cli")]
        caller: String,
    },
    /// Show usage totals for a caller.
    Usage {
        #[arg(long)]
        caller: String,
        /// Only the last N days.
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show latency and cost per provider/model for an agent.
    Performance {
        #[arg(long)]
        agent: String,
    },
    /// Reload and list the pricing table.
    Pricing,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => switchyard_config::load_and_validate_path(path),
        None => switchyard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            switchyard_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "switchyard failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: SwitchyardConfig) -> Result<ExitCode, SwitchyardError> {
    let runtime = Runtime::start(config).await?;

    if let Commands::Serve = command {
        serve::run_serve(runtime).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let result = dispatch(&runtime, command).await;
    runtime.finish(result).await
}

async fn dispatch(runtime: &Runtime, command: Commands) -> Result<ExitCode, SwitchyardError> {
    match command {
        Commands::Serve => Ok(ExitCode::SUCCESS),
        Commands::Generate {
            prompt,
            profile,
            web_search,
            deep_research,
            effort,
            caller,
        } => {
            let options = GenerateOptions {
                prompt,
                profile,
                web_search,
                deep_research,
                effort,
                caller,
            };
            // Exit code 2 signals the degraded offline answer.
            match commands::run_generate(runtime, options).await? {
                true => Ok(ExitCode::SUCCESS),
                false => Ok(ExitCode::from(2)),
            }
        }
        Commands::Usage { caller, days } => {
            commands::run_usage(runtime, &caller, days).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Performance { agent } => {
            commands::run_performance(runtime, &agent).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Pricing => {
            commands::run_pricing(runtime).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// `RUST_LOG` wins; otherwise `service.log_level` applies to switchyard crates.
fn init_tracing(config: &SwitchyardConfig) {
    use tracing_subscriber::EnvFilter;

    let level = &config.service.log_level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "switchyard={level},switchyard_agent={level},switchyard_cost={level},\
             switchyard_storage={level},switchyard_anthropic={level},\
             switchyard_openai={level},switchyard_ollama={level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "switchyard",
            "generate",
            "What's your pricing?",
            "--profile",
            "local",
            "--web-search",
            "--effort",
            "high",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                prompt,
                profile,
                web_search,
                deep_research,
                effort,
                caller,
            } => {
                assert_eq!(prompt, "What's your pricing?");
                assert_eq!(profile.as_deref(), Some("local"));
                assert!(web_search);
                assert!(!deep_research);
                assert_eq!(effort, ReasoningEffort::High);
                assert_eq!(caller, "cli");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn usage_requires_caller() {
        assert!(Cli::try_parse_from(["switchyard", "usage"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = switchyard_config::load_and_validate_str("").unwrap();
        assert_eq!(config.service.name, "switchyard");
    }
}
