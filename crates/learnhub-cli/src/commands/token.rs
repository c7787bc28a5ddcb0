//! Development token minting.

use chrono::Utc;
use clap::Args;
use serde::Serialize;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use learnhub_auth::JwtEncoder;
use learnhub_core::config::AppConfig;
use learnhub_core::error::AppError;
use learnhub_entity::user::Role;

const DEFAULT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Subject user id (random when omitted)
    #[arg(short, long)]
    pub user: Option<Uuid>,

    /// Role claim: organization, instructor, member or guest
    #[arg(short, long, default_value = "organization")]
    pub role: String,

    /// Organization claim
    #[arg(short, long)]
    pub organization: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct IssuedToken {
    user_id: Uuid,
    role: Role,
    organization_id: Option<Uuid>,
    expires_at: chrono::DateTime<Utc>,
    token: String,
}

/// Sign a token with the configured secret.
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let role: Role = args.role.parse()?;
    let user_id = args.user.unwrap_or_else(Uuid::new_v4);

    if config.auth.jwt_secret == DEFAULT_SECRET {
        output::print_warning("Signing with the default JWT secret.");
    }
    if matches!(role, Role::Organization | Role::Member) && args.organization.is_none() {
        output::print_warning("No --organization given; requests with this token will not resolve a tenant.");
    }

    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) = encoder.issue(user_id, role, args.organization, Utc::now())?;

    let issued = IssuedToken {
        user_id,
        role,
        organization_id: args.organization,
        expires_at,
        token,
    };

    match format {
        OutputFormat::Json => output::print_json(&issued),
        OutputFormat::Table => {
            output::print_kv("User", &issued.user_id.to_string());
            output::print_kv("Role", issued.role.as_str());
            output::print_kv(
                "Organization",
                &issued.organization_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            );
            output::print_kv("Expires at", &issued.expires_at.to_rfc3339());
            println!();
            println!("{}", issued.token);
        }
    }
    Ok(())
}
