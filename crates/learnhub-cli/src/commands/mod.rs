//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod token;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use learnhub_core::config::AppConfig;
use learnhub_core::error::AppError;

/// LearnHub administration tool
#[derive(Debug, Parser)]
#[command(name = "learnhub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and the environment overlays
    #[arg(short, long, env = "LEARNHUB_CONFIG_DIR", default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to merge (`config/{env}.toml`)
    #[arg(short, long, env = "LEARNHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Mint a development bearer token
    Token(token::TokenArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.load_config()?, self.format).await,
            Commands::Token(args) => token::execute(args, &self.load_config()?, self.format),
            Commands::Config(args) => config::execute(args, self, self.format),
        }
    }

    /// Load the layered configuration this invocation points at.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config_dir, &self.env)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_token_arguments_parse() {
        let cli = Cli::try_parse_from([
            "learnhub",
            "--config-dir",
            "conf",
            "token",
            "--role",
            "instructor",
            "--organization",
            "3f1b7c9e-2a4d-4e8f-9b6a-1c2d3e4f5a6b",
        ])
        .unwrap();

        assert_eq!(cli.config_dir, "conf");
        match cli.command {
            Commands::Token(args) => {
                assert_eq!(args.role, "instructor");
                assert!(args.organization.is_some());
                assert!(args.user.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
