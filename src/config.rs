//! Client configuration.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::error::{BloodRequestError, Result};

/// Configuration shared by the API client and the screen controllers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin the API paths are resolved against (e.g. <https://donors.example.com>)
    pub base_url: String,

    /// Path of the static area reference dataset
    pub areas_path: String,

    /// Timeout for each individual API call in milliseconds
    pub timeout_ms: u64,

    /// Artificial delay before the request form is shown, in milliseconds
    pub reveal_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            areas_path: "/data/areas.json".to_string(),
            timeout_ms: 30_000,
            reveal_delay_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `BLOOD_REQUEST_*` environment variables,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            base_url: try_load("BLOOD_REQUEST_BASE_URL", defaults.base_url)?,
            areas_path: try_load("BLOOD_REQUEST_AREAS_PATH", defaults.areas_path)?,
            timeout_ms: try_load("BLOOD_REQUEST_TIMEOUT_MS", defaults.timeout_ms)?,
            reveal_delay_ms: try_load("BLOOD_REQUEST_REVEAL_DELAY_MS", defaults.reveal_delay_ms)?,
        })
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            BloodRequestError::Config(format!("invalid {key} value '{raw}': {e}"))
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://api.test","reveal_delay_ms":0}"#).unwrap();
        assert_eq!(config.base_url, "https://api.test");
        assert_eq!(config.reveal_delay_ms, 0);
        assert_eq!(config.areas_path, "/data/areas.json");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_from_env_overlays_defaults() {
        // SAFETY: no other test reads or writes these keys
        unsafe {
            env::set_var("BLOOD_REQUEST_BASE_URL", "https://donors.example.com");
            env::set_var("BLOOD_REQUEST_REVEAL_DELAY_MS", " 250 ");
        }
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://donors.example.com");
        assert_eq!(config.reveal_delay_ms, 250);
        assert_eq!(config.areas_path, "/data/areas.json");

        unsafe { env::set_var("BLOOD_REQUEST_TIMEOUT_MS", "soon") };
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, BloodRequestError::Config(_)));

        unsafe {
            env::remove_var("BLOOD_REQUEST_BASE_URL");
            env::remove_var("BLOOD_REQUEST_REVEAL_DELAY_MS");
            env::remove_var("BLOOD_REQUEST_TIMEOUT_MS");
        }
    }

    #[test]
    fn test_try_load_missing_falls_back() {
        let value: u64 = try_load("BLOOD_REQUEST_TEST_SURELY_UNSET_KEY", 42).unwrap();
        assert_eq!(value, 42);
    }
}
