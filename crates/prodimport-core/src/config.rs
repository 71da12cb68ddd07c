use crate::app_config::{AdminCredentials, AppConfig};
use crate::ConfigError;

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
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let backend_url = require("MEDUSA_BACKEND_URL")?;

    let credentials = match (
        optional("MEDUSA_ADMIN_TOKEN"),
        optional("MEDUSA_ADMIN_EMAIL"),
        optional("MEDUSA_ADMIN_PASSWORD"),
    ) {
        (Some(token), _, _) => AdminCredentials::Token(token),
        (None, Some(email), Some(password)) => AdminCredentials::Password { email, password },
        _ => return Err(ConfigError::MissingCredentials),
    };

    let products_path = PathBuf::from(or_default("PRODIMPORT_PRODUCTS_PATH", "products.csv"));
    let log_level = or_default("PRODIMPORT_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("PRODIMPORT_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRODIMPORT_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let user_agent = or_default("PRODIMPORT_USER_AGENT", "prodimport/0.1");
    let max_retries = parse_u32("PRODIMPORT_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("PRODIMPORT_RETRY_BACKOFF_BASE_SECS", "1")?;

    let category_page_size = parse_u32("PRODIMPORT_CATEGORY_PAGE_SIZE", "100")?;
    if category_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRODIMPORT_CATEGORY_PAGE_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let max_concurrent_rows = parse_usize("PRODIMPORT_MAX_CONCURRENT_ROWS", "1")?;
    if max_concurrent_rows == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRODIMPORT_MAX_CONCURRENT_ROWS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        backend_url,
        credentials,
        products_path,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        category_page_size,
        max_concurrent_rows,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
