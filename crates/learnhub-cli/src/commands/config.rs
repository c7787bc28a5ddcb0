//! Configuration inspection commands.

use clap::{Args, Subcommand};

use super::Cli;
use crate::output::{self, OutputFormat};
use learnhub_core::config::AppConfig;
use learnhub_core::error::AppError;
use learnhub_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration with secrets masked
    Show,
    /// Load the configuration and report problems
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, cli: &Cli, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = redacted(cli.load_config()?);
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => summary(&config),
            }
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!(
                    "Configuration '{}' ({}) is valid",
                    cli.config_dir, cli.env
                ));
                for warning in warnings(&config) {
                    output::print_warning(warning);
                }
                summary(&redacted(config));
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }
    Ok(())
}

fn redacted(mut config: AppConfig) -> AppConfig {
    config.database.url = mask_password(&config.database.url);
    config.auth.jwt_secret = "****".into();
    config
}

fn summary(config: &AppConfig) {
    output::print_kv("Server", &format!("{}:{}", config.server.host, config.server.port));
    output::print_kv("Database backend", &format!("{:?}", config.database.backend));
    output::print_kv("Database", &config.database.url);
    output::print_kv("Storage root", &config.storage.root_path);
    output::print_kv("Max upload", &format!("{} bytes", config.storage.max_upload_size_bytes));
    output::print_kv("Logging", &format!("{} ({})", config.logging.level, config.logging.format));
}

fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if config.auth.jwt_secret == "CHANGE_ME_IN_PRODUCTION" {
        warnings.push("auth.jwt_secret still has its placeholder value");
    }
    if config.server.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("server.cors.allowed_origins allows any origin");
    }
    if !matches!(config.logging.format.as_str(), "json" | "pretty") {
        warnings.push("logging.format is neither `json` nor `pretty`; falling back to pretty");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = AppConfig::default();
        config.database.url = "postgres://app:hunter2@db/learnhub".into();
        let shown = redacted(config);
        assert_eq!(shown.database.url, "postgres://app:****@db/learnhub");
        assert_eq!(shown.auth.jwt_secret, "****");
    }

    #[test]
    fn test_default_config_warns_about_placeholders() {
        let warnings = warnings(&AppConfig::default());
        assert!(warnings.iter().any(|w| w.contains("jwt_secret")));
    }
}
