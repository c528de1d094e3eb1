use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://nukesul-boood-2ab7.twc1.net";
pub const DEFAULT_USER_AGENT: &str = "nukesul/0.1 (storefront-client)";

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
/// Every variable has a default, so an empty environment yields a working
/// configuration pointed at the production API.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let env = parse_environment(&or_default("NUKESUL_ENV", "development"))?;

    let api_base_url = or_default("NUKESUL_API_BASE_URL", DEFAULT_API_BASE_URL);
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "NUKESUL_API_BASE_URL".to_string(),
            reason: format!("\"{api_base_url}\" is not an http(s) URL"),
        });
    }
    let api_base_url = api_base_url.trim_end_matches('/').to_string();

    let log_level = or_default("NUKESUL_LOG_LEVEL", "info");
    let state_dir = PathBuf::from(or_default("NUKESUL_STATE_DIR", "./.nukesul"));
    let request_timeout_secs = parse_u64("NUKESUL_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "NUKESUL_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("NUKESUL_USER_AGENT", DEFAULT_USER_AGENT);
    let checkout_route = or_default("NUKESUL_CHECKOUT_ROUTE", "/checkout");
    let admin_login_route = or_default("NUKESUL_ADMIN_LOGIN_ROUTE", "/admin/login");
    let tiered_subcategory_ids = parse_id_list(
        "NUKESUL_TIERED_SUBCATEGORY_IDS",
        &or_default("NUKESUL_TIERED_SUBCATEGORY_IDS", ""),
    )?;
    let block_branch_switch_after_order =
        parse_bool("NUKESUL_BLOCK_BRANCH_SWITCH_AFTER_ORDER", "false")?;

    Ok(AppConfig {
        env,
        api_base_url,
        log_level,
        state_dir,
        request_timeout_secs,
        user_agent,
        checkout_route,
        admin_login_route,
        tiered_subcategory_ids,
        block_branch_switch_after_order,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NUKESUL_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parse a comma-separated list of numeric ids, ignoring blank entries.
fn parse_id_list(var: &str, raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("\"{s}\": {e}"),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
