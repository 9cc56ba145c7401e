use crate::app_config::{AppConfig, DEFAULT_SERVICE_URL, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a config
/// pointed at a local analysis service.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let service_url = parse_service_url(&or_default("YTSENT_SERVICE_URL", DEFAULT_SERVICE_URL))
        .map_err(|reason| invalid("YTSENT_SERVICE_URL", reason))?;
    let log_level = or_default("YTSENT_LOG_LEVEL", "info");
    let user_agent = or_default("YTSENT_USER_AGENT", DEFAULT_USER_AGENT);

    let request_timeout_secs = parse_u64("YTSENT_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "YTSENT_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let poll_interval_ms = parse_u64("YTSENT_POLL_INTERVAL_MS", "1000")?;
    if poll_interval_ms == 0 {
        return Err(invalid(
            "YTSENT_POLL_INTERVAL_MS",
            "must be greater than zero".to_string(),
        ));
    }

    // 0 and unset both mean "no cap".
    let poll_max_attempts = match lookup("YTSENT_POLL_MAX_ATTEMPTS") {
        Ok(raw) => {
            let n = raw
                .parse::<u32>()
                .map_err(|e| invalid("YTSENT_POLL_MAX_ATTEMPTS", e.to_string()))?;
            (n > 0).then_some(n)
        }
        Err(_) => None,
    };

    Ok(AppConfig {
        service_url,
        log_level,
        request_timeout_secs,
        user_agent,
        poll_interval_ms,
        poll_max_attempts,
    })
}

/// Trim and sanity-check the service origin.
///
/// Only the scheme is checked here; the HTTP client does the full URL parse.
fn parse_service_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(format!("'{trimmed}' must start with http:// or https://"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
