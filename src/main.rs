// Solace - Wellness support chat backend
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use solace::config::{load_config, Config};
use solace::conversation::Message;
use solace::crisis::{resources_for_key, RiskAssessor};
use solace::errors::{config_parse_hint, ConfigError};
use solace::pipeline::ChatPipeline;
use solace::server::SolaceServer;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "solace")]
#[command(about = "Sentiment-aware wellness support chat backend", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.solace/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Bind address (overrides config and SOLACE_BIND)
        #[arg(long)]
        bind: Option<String>,

        /// Also write logs to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Run one message through the pipeline and print the result as JSON
    Chat {
        message: String,
    },
    /// Print the risk assessment for a message
    Assess {
        message: String,
    },
    /// List crisis resources for a risk level (low, medium, high)
    Resources {
        level: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ORT_LOGGING_LEVEL: 0=Verbose, 1=Info, 2=Warning, 3=Error, 4=Fatal
    std::env::set_var("ORT_LOGGING_LEVEL", "3");

    let args = Args::parse();

    let log_file = match &args.command {
        Command::Serve { log_file, .. } => log_file.as_deref(),
        _ => None,
    };
    init_tracing(log_file)?;

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e @ ConfigError::Parse { .. }) => {
            eprintln!("{}", config_parse_hint(&e));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    match args.command {
        Command::Serve { bind, .. } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            run_server(config).await
        }
        Command::Chat { message } => run_chat(&config, &message).await,
        Command::Assess { message } => run_assess(&config, &message),
        Command::Resources { level } => {
            for resource in resources_for_key(&level) {
                println!("- {}", resource);
            }
            Ok(())
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    // SOLACE_DEBUG=1 forces debug output regardless of RUST_LOG
    let show_debug = std::env::var("SOLACE_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let env_filter = if show_debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let file_writer = Arc::new(file);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(move || file_writer.clone())
                    .with_ansi(false), // No ANSI colors in log file
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();

    if let Some(path) = log_file {
        eprintln!("Logs: {}", path.display());
    }
    Ok(())
}

fn build_assessor(config: &Config) -> Result<RiskAssessor> {
    match &config.risk_keywords_path {
        Some(path) => RiskAssessor::load_from_file(path),
        None => Ok(RiskAssessor::default()),
    }
}

/// Run HTTP server
async fn run_server(config: Config) -> Result<()> {
    tracing::info!("Starting Solace");

    let selection = config.generation.resolve();
    let pipeline = ChatPipeline::from_config(&config, &selection)?;

    if config.sentiment.preload {
        let classifier = Arc::clone(pipeline.classifier());
        tokio::spawn(async move {
            if !classifier.preload().await {
                tracing::warn!("Sentiment model unavailable, messages will be scored NEUTRAL");
            }
        });
    }

    SolaceServer::new(config, pipeline, selection.provider_name())
        .serve()
        .await
}

/// Execute a single message
async fn run_chat(config: &Config, text: &str) -> Result<()> {
    let message = Message::user_with_limit(text, config.limits.max_message_chars)?;
    let pipeline = ChatPipeline::from_config(config, &config.generation.resolve())?;

    let result = pipeline.process(&message, &[]).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_assess(config: &Config, text: &str) -> Result<()> {
    let assessor = build_assessor(config)?;
    let assessment = assessor.assess(text);

    println!("{}", serde_json::to_string_pretty(&assessment)?);
    let low_risk = assessor.low_risk_matches(text);
    if !low_risk.is_empty() {
        eprintln!("Low-risk terms: {}", low_risk.join(", "));
    }
    Ok(())
}
