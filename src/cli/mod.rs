use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::perplexity::PerplexityRemote;
use crate::core::content::Reply;
use crate::infra::config::{Config, PerplexityConfig};

#[derive(Parser)]
#[command(name = "perplexity-mcp")]
#[command(about = "MCP server exposing the Perplexity answer engine as a tool")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (stdio by default, MODE=server for HTTP)
    Serve,
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Send a single prompt to Perplexity and print the answer
    Ask {
        /// The prompt/question to send
        prompt: String,
    },
    /// Health check a running server-mode instance
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start Perplexity MCP server");
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Ask { prompt } => match ask(&prompt).await {
            Ok(answer) => {
                println!("{}", answer);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    PerplexityConfig::from_env()?;
    Config::from_env()?;
    Ok(())
}

async fn ask(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let cfg = PerplexityConfig::from_env()?;
    let remote = PerplexityRemote::from_config(&cfg)?;
    match remote.query(prompt).await {
        Reply::Answer(text) => Ok(text),
        Reply::Failure(diagnostic) => Err(diagnostic.into()),
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}
