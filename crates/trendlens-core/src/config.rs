use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let env = parse_environment(&or_default("TRENDLENS_ENV", "development"));
    let bind_addr = parse_addr("TRENDLENS_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("TRENDLENS_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("TRENDLENS_CATALOG_PATH", "./config/catalog.yaml"));

    // The credential is deliberately optional at load time: its absence is a
    // request-level failure, not a startup failure.
    let llm_base_url = or_default("TRENDLENS_LLM_BASE_URL", "https://ai.gateway.lovable.dev");
    let llm_api_key = lookup("TRENDLENS_LLM_API_KEY").ok().filter(|k| !k.is_empty());
    let llm_model = or_default("TRENDLENS_LLM_MODEL", "google/gemini-2.5-flash");

    let llm_request_timeout_secs = parse_u64("TRENDLENS_LLM_REQUEST_TIMEOUT_SECS", "120")?;
    let page_fetch_timeout_secs = parse_u64("TRENDLENS_PAGE_FETCH_TIMEOUT_SECS", "30")?;
    let image_probe_timeout_secs = parse_u64("TRENDLENS_IMAGE_PROBE_TIMEOUT_SECS", "5")?;
    let cache_ttl_secs = parse_u64("TRENDLENS_CACHE_TTL_SECS", "1800")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        llm_base_url,
        llm_api_key,
        llm_model,
        llm_request_timeout_secs,
        page_fetch_timeout_secs,
        image_probe_timeout_secs,
        cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
