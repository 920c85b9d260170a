use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rolewarden_core::AppError;
use rolewarden_infrastructure::GatewayBridgeConfig;
use tracing_subscriber::EnvFilter;
use url::Url;

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub admin_api_token: String,
    pub admin_cors_origin: Option<String>,
    pub gateway_bridge_secret: String,
    pub gateway_bridge_url: Url,
    pub platform_api_base_url: Url,
    pub platform_bot_token: String,
    pub member_chunk_timeout: Duration,
    pub revocation_dedup: Duration,
    pub event_queue_capacity: usize,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(migrate_only: bool, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required_env(&lookup, "DATABASE_URL")?;
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let admin_api_token = required_secret(&lookup, "ADMIN_API_TOKEN")?;
        let admin_cors_origin = lookup("ADMIN_CORS_ORIGIN").filter(|value| !value.trim().is_empty());
        let gateway_bridge_secret = required_secret(&lookup, "GATEWAY_BRIDGE_SECRET")?;
        let gateway_bridge_url = parse_url(
            "GATEWAY_BRIDGE_URL",
            required_env(&lookup, "GATEWAY_BRIDGE_URL")?.as_str(),
        )?;
        let platform_api_base_url = parse_url(
            "PLATFORM_API_BASE_URL",
            lookup("PLATFORM_API_BASE_URL")
                .unwrap_or_else(|| "https://discord.com/api/v10".to_owned())
                .as_str(),
        )?;
        let platform_bot_token = required_env(&lookup, "PLATFORM_BOT_TOKEN")?;
        if platform_bot_token.trim().is_empty() {
            return Err(AppError::Validation(
                "PLATFORM_BOT_TOKEN must not be empty".to_owned(),
            ));
        }

        let member_chunk_timeout_seconds =
            parse_env_u64(&lookup, "MEMBER_CHUNK_TIMEOUT_SECONDS", 30)?;
        if member_chunk_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "MEMBER_CHUNK_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }
        let revocation_dedup_seconds = parse_env_u64(&lookup, "REVOCATION_DEDUP_SECONDS", 60)?;
        let event_queue_capacity = parse_env_u64(&lookup, "EVENT_QUEUE_CAPACITY", 1024)?;
        if event_queue_capacity == 0 {
            return Err(AppError::Validation(
                "EVENT_QUEUE_CAPACITY must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            admin_api_token,
            admin_cors_origin,
            gateway_bridge_secret,
            gateway_bridge_url,
            platform_api_base_url,
            platform_bot_token,
            member_chunk_timeout: Duration::from_secs(member_chunk_timeout_seconds),
            revocation_dedup: Duration::from_secs(revocation_dedup_seconds),
            event_queue_capacity: usize::try_from(event_queue_capacity).map_err(|error| {
                AppError::Validation(format!("invalid EVENT_QUEUE_CAPACITY: {error}"))
            })?,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn gateway_bridge_config(&self) -> GatewayBridgeConfig {
        GatewayBridgeConfig {
            platform_api_base_url: self.platform_api_base_url.clone(),
            bot_token: self.platform_bot_token.clone(),
            bridge_url: self.gateway_bridge_url.clone(),
            bridge_secret: self.gateway_bridge_secret.clone(),
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn required_secret<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required_env(lookup, name)?;
    if value.len() < MIN_SECRET_LENGTH {
        return Err(AppError::Validation(format!(
            "{name} must be at least {MIN_SECRET_LENGTH} characters"
        )));
    }

    Ok(value)
}

fn parse_env_u64<F>(lookup: &F, name: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, AppError> {
    Url::parse(value).map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}
