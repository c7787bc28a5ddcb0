//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use learnhub_core::config::{AppConfig, DatabaseBackend};
use learnhub_core::error::AppError;
use learnhub_database::DatabasePool;
use learnhub_database::connection::mask_password;
use learnhub_database::migration;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show embedded migrations and whether they are applied
    Status,
}

/// One line of `migrate status`.
#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    #[tabled(rename = "Version")]
    version: i64,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Applied")]
    applied: bool,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    if matches!(config.database.backend, DatabaseBackend::Memory) {
        output::print_warning("The configured backend is `memory`; there is no schema to migrate.");
        return Ok(());
    }

    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run { yes } => {
            if !yes {
                let prompt = format!("Apply pending migrations to {}?", mask_password(&config.database.url));
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(true)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let applied = migration::applied_versions(pool.pool()).await.unwrap_or_default();
            let rows = status_rows(migration::embedded(), &applied);
            output::print_list(&rows, format);
        }
    }

    pool.close().await;
    Ok(())
}

fn status_rows(embedded: Vec<(i64, String)>, applied: &[i64]) -> Vec<MigrationRow> {
    embedded
        .into_iter()
        .map(|(version, description)| MigrationRow {
            version,
            description,
            applied: applied.contains(&version),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_rows_mark_applied_versions() {
        let rows = status_rows(
            vec![(1, "create organizations".into()), (2, "create documents".into())],
            &[1],
        );
        assert!(rows[0].applied);
        assert!(!rows[1].applied);
    }
}
