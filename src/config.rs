use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORAGE_KEY: &str = "cleancity_reports_v1";

#[derive(Clone, Debug)]
pub struct Config {
    // Storage
    pub data_dir: PathBuf,
    pub storage_key: String,

    // Image acquisition
    pub image_read_timeout: Duration,
    pub max_image_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".cleancity"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            image_read_timeout: Duration::from_secs(10),
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let data_dir = PathBuf::from(env("CLEANCITY_DATA_DIR", ".cleancity"));
        let storage_key = env("CLEANCITY_STORAGE_KEY", DEFAULT_STORAGE_KEY);

        let timeout_raw = env("CLEANCITY_IMAGE_READ_TIMEOUT", "10s");
        let image_read_timeout = humantime::parse_duration(&timeout_raw).map_err(|e| {
            ConfigError::InvalidEnvVar("CLEANCITY_IMAGE_READ_TIMEOUT".to_string(), e.to_string())
        })?;
        let max_image_bytes = env("CLEANCITY_MAX_IMAGE_BYTES", "5242880")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEANCITY_MAX_IMAGE_BYTES".to_string(), e.to_string())
            })?;

        let config = Self {
            data_dir,
            storage_key,
            image_read_timeout,
            max_image_bytes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnvVar("CLEANCITY_DATA_DIR".to_string(), "cannot be empty".to_string()));
        }

        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar("CLEANCITY_STORAGE_KEY".to_string(), "cannot be empty".to_string()));
        }

        if self.storage_key.contains(['/', '\\']) || self.storage_key.contains("..") {
            return Err(ConfigError::InvalidEnvVar(
                "CLEANCITY_STORAGE_KEY".to_string(),
                "must not contain path separators".to_string(),
            ));
        }

        if self.image_read_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar("CLEANCITY_IMAGE_READ_TIMEOUT".to_string(), "must be positive".to_string()));
        }

        if self.max_image_bytes == 0 {
            return Err(ConfigError::InvalidEnvVar("CLEANCITY_MAX_IMAGE_BYTES".to_string(), "must be positive".to_string()));
        }

        Ok(())
    }

    /// File that holds the report slot.
    pub fn slot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

fn env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_path() {
        let config = Config {
            data_dir: PathBuf::from("/var/lib/cleancity"),
            ..Config::default()
        };
        assert_eq!(
            config.slot_path(),
            PathBuf::from("/var/lib/cleancity/cleancity_reports_v1.json")
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let empty_key = Config {
            storage_key: "  ".to_string(),
            ..Config::default()
        };
        assert!(empty_key.validate().is_err());

        let traversal = Config {
            storage_key: "../reports".to_string(),
            ..Config::default()
        };
        assert!(traversal.validate().is_err());

        let zero_timeout = Config {
            image_read_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert!(zero_timeout.validate().is_err());

        let zero_limit = Config {
            max_image_bytes: 0,
            ..Config::default()
        };
        assert!(zero_limit.validate().is_err());
    }
}
