use crate::app_config::AppConfig;
use crate::record::GeoPoint;
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
/// Decoupled from the real environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u8>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        match parse_u64(var, default)? {
            0 => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            value => Ok(value),
        }
    };

    let airtable_api_key = require("AIRTABLE_API_KEY")?;
    let airtable_base_id = require("AIRTABLE_BASE_ID")?;
    let airtable_table_name = or_default("AIRTABLE_TABLE_NAME", "AED Locations");
    let airtable_api_url = or_default("AEDMAP_AIRTABLE_API_URL", "https://api.airtable.com/v0")
        .trim_end_matches('/')
        .to_string();

    let log_level = or_default("AEDMAP_LOG_LEVEL", "info");
    let request_timeout_secs = parse_positive_u64("AEDMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("AEDMAP_USER_AGENT", "aedmap/0.1 (community-aed-map)");
    let max_retries = parse_u32("AEDMAP_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("AEDMAP_RETRY_BACKOFF_BASE_MS", "500")?;

    let locate_timeout_ms = parse_positive_u64("AEDMAP_LOCATE_TIMEOUT_MS", "10000")?;
    let locate_max_age_ms = parse_u64("AEDMAP_LOCATE_MAX_AGE_MS", "30000")?;

    let emergency_number = or_default("AEDMAP_EMERGENCY_NUMBER", "999");
    let report_update_url = lookup("AEDMAP_REPORT_UPDATE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let map_center = parse_map_center(&or_default("AEDMAP_MAP_CENTER", "49.2144,-2.1313"))?;
    let map_zoom = parse_u8("AEDMAP_MAP_ZOOM", "12")?;

    Ok(AppConfig {
        airtable_api_key,
        airtable_base_id,
        airtable_table_name,
        airtable_api_url,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        locate_timeout_ms,
        locate_max_age_ms,
        emergency_number,
        report_update_url,
        map_center,
        map_zoom,
    })
}

/// Parse a `"lat,lng"` pair into a [`GeoPoint`].
fn parse_map_center(raw: &str) -> Result<GeoPoint, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar {
        var: "AEDMAP_MAP_CENTER".to_string(),
        reason: reason.to_string(),
    };

    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid("expected \"lat,lng\""))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(&e.to_string()))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(&e.to_string()))?;

    GeoPoint::new(lat, lng).ok_or_else(|| invalid("coordinates out of range"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
