use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8000,http://127.0.0.1:8000";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Provider keys are optional; an empty value means "not configured".
    let optional_key = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("COBALT_ENV", "development"))?;
    let bind_addr = parse_addr("COBALT_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("COBALT_LOG_LEVEL", "info");
    let cors_origins = parse_origins(&or_default("COBALT_CORS_ORIGINS", DEFAULT_CORS_ORIGINS));

    let db_max_connections = parse_u32("COBALT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("COBALT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("COBALT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let provider_timeout_secs = parse_u64("COBALT_PROVIDER_TIMEOUT_SECS", "8")?;
    if provider_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "COBALT_PROVIDER_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    let maps_api_key = optional_key("GOOGLE_MAPS_API_KEY");
    let openai_api_key = optional_key("OPENAI_API_KEY");
    let openai_model = or_default("OPENAI_MODEL", "gpt-3.5-turbo");
    let elevenlabs_api_key = optional_key("ELEVENLABS_API_KEY");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        cors_origins,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        provider_timeout_secs,
        maps_api_key,
        openai_api_key,
        openai_model,
        elevenlabs_api_key,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COBALT_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
