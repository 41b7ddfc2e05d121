//! Elevar elevation agent runtime.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use elevar_application::{ActivateEligibleRolesInput, AuthContextProvider, ElevationService};
use elevar_core::{AppError, AppResult};
use elevar_infrastructure::{ArmControlPlane, EnvAuthContextProvider};

use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentMode {
    List,
    Activate,
}

#[derive(Debug, Clone)]
struct AgentConfig {
    mode: AgentMode,
    arm_base_url: Url,
    http_timeout_seconds: u64,
    include_scope_details: bool,
    activate_all: bool,
    scopes: Vec<String>,
    role_names: Vec<String>,
    justification: String,
    duration_hours: i64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AgentConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let control_plane = Arc::new(ArmControlPlane::new(http_client, &config.arm_base_url));
    let service = ElevationService::new(control_plane);
    let ctx = EnvAuthContextProvider::new().acquire().await?;

    info!(
        mode = ?config.mode,
        arm_base_url = %config.arm_base_url,
        principal_id = %ctx.principal_id(),
        user_name = ctx.user_name().unwrap_or("<unknown>"),
        "elevar-agent started"
    );

    match config.mode {
        AgentMode::List => {
            let roles = service
                .list_eligible(&ctx, config.include_scope_details)
                .await?;

            info!(eligible_count = roles.len(), "eligibility scan finished");
            print_json(&serde_json::json!({ "eligibleRoles": roles }))?;
        }
        AgentMode::Activate => {
            let report = service
                .activate_eligible(
                    &ctx,
                    ActivateEligibleRolesInput {
                        activate_all: config.activate_all,
                        scopes: config.scopes.clone(),
                        role_names: config.role_names.clone(),
                        justification: config.justification.clone(),
                        duration_hours: config.duration_hours,
                    },
                )
                .await?;

            info!(
                total = report.summary.total,
                successful = report.summary.successful,
                skipped = report.summary.skipped,
                failed = report.summary.failed,
                "activation batch finished"
            );
            print_json(&report)?;
        }
    }

    Ok(())
}

impl AgentConfig {
    fn load() -> AppResult<Self> {
        let mode = match env::args().nth(1).as_deref() {
            None | Some("list") => AgentMode::List,
            Some("activate") => AgentMode::Activate,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown mode '{other}'; expected 'list' or 'activate'"
                )));
            }
        };

        let raw_base_url = env::var("ARM_BASE_URL")
            .unwrap_or_else(|_| "https://management.azure.com".to_owned());
        let arm_base_url = Url::parse(&raw_base_url).map_err(|error| {
            AppError::Validation(format!("invalid ARM_BASE_URL '{raw_base_url}': {error}"))
        })?;

        let http_timeout_seconds = parse_env_u64("HTTP_TIMEOUT_SECONDS", 30)?;
        if http_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            mode,
            arm_base_url,
            http_timeout_seconds,
            include_scope_details: parse_env_bool("PIM_INCLUDE_SCOPE_DETAILS", true),
            activate_all: parse_env_bool("PIM_ACTIVATE_ALL", false),
            scopes: parse_env_list("PIM_SCOPES"),
            role_names: parse_env_list("PIM_ROLE_NAMES"),
            justification: env::var("PIM_JUSTIFICATION").unwrap_or_default(),
            duration_hours: parse_env_i64("PIM_DURATION_HOURS", 0)?,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to serialize result: {error}")))?;
    println!("{rendered}");
    Ok(())
}

fn parse_env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => value.eq_ignore_ascii_case("true") || value == "1",
        Err(_) => default,
    }
}

fn parse_env_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_i64(name: &str, default: i64) -> AppResult<i64> {
    match env::var(name) {
        Ok(value) => value.parse::<i64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
