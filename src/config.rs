use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub token: TokenConfig,

    pub security: SecurityConfig,

    pub pagination: PaginationConfig,

    pub validation: ValidationConfig,

    pub search: SearchConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Tokio worker threads, 0 lets the runtime decide
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:watch-server.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    pub handler_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
            handler_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC secret for signing tokens. A random one is generated for fresh configs.
    pub secret_key: String,

    pub access_duration_minutes: i64,

    pub refresh_duration_minutes: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_key: generate_secret_key(),
            access_duration_minutes: 15,
            refresh_duration_minutes: 60 * 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Query parameter holding the page number
    pub page_var: String,

    pub page_min: u64,

    /// Query parameter holding the page size
    pub per_page_var: String,

    pub per_page_default: u64,

    pub per_page_min: u64,

    pub per_page_max: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_var: "page".to_string(),
            page_min: 1,
            per_page_var: "per_page".to_string(),
            per_page_default: 20,
            per_page_min: 1,
            per_page_max: 100,
        }
    }
}

/// Inclusive length bounds, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl LengthRange {
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRules {
    pub length: LengthRange,
    pub required_numbers: usize,
    pub required_lower_letters: usize,
    pub required_upper_letters: usize,
    pub required_special_chars: usize,
}

impl Default for PasswordRules {
    fn default() -> Self {
        Self {
            length: LengthRange::new(8, 64),
            required_numbers: 1,
            required_lower_letters: 1,
            required_upper_letters: 1,
            required_special_chars: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub search_query: LengthRange,

    pub invalidation: LengthRange,

    /// Maximum number of items in a bulk request body
    pub array_max_length: usize,

    pub email: LengthRange,

    pub password: PasswordRules,

    pub first_name: LengthRange,

    pub last_name: LengthRange,

    pub bio: LengthRange,

    pub birthdate_min: NaiveDate,

    pub film_title: LengthRange,

    pub film_descriptions: LengthRange,

    pub date_released_min: NaiveDate,

    /// Film duration bounds in minutes
    pub duration_min: i32,

    pub duration_max: i32,

    pub season_number_max: i32,

    pub episode_number_max: i32,

    pub series_title: LengthRange,

    pub series_descriptions: LengthRange,

    pub date_started_min: NaiveDate,

    pub date_ended_min: NaiveDate,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let epoch = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default();
        Self {
            search_query: LengthRange::new(1, 100),
            invalidation: LengthRange::new(1, 200),
            array_max_length: 100,
            email: LengthRange::new(5, 254),
            password: PasswordRules::default(),
            first_name: LengthRange::new(1, 50),
            last_name: LengthRange::new(1, 50),
            bio: LengthRange::new(0, 1000),
            birthdate_min: epoch,
            film_title: LengthRange::new(1, 200),
            film_descriptions: LengthRange::new(0, 5000),
            date_released_min: NaiveDate::from_ymd_opt(1888, 1, 1).unwrap_or_default(),
            duration_min: 1,
            duration_max: 1000,
            season_number_max: 100,
            episode_number_max: 10_000,
            series_title: LengthRange::new(1, 200),
            series_descriptions: LengthRange::new(0, 5000),
            date_started_min: epoch,
            date_ended_min: epoch,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,

    /// Base URL of the Elasticsearch-compatible search backend
    pub url: String,

    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://localhost:9200".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("watch-server").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".watch-server").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default config (with a freshly generated token secret) when no
    /// config file exists in any of the searched locations.
    pub fn create_default_if_missing() -> Result<bool> {
        if Self::config_paths().iter().any(|p| p.exists()) {
            return Ok(false);
        }

        let path = Self::default_config_path();
        Self::default().save_to_path(&path)?;
        info!("Created default config file: {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.secret_key.len() < 32 {
            anyhow::bail!("Token secret key must be at least 32 characters");
        }

        if self.token.access_duration_minutes <= 0 || self.token.refresh_duration_minutes <= 0 {
            anyhow::bail!("Token durations must be positive");
        }

        let p = &self.pagination;
        if p.page_min == 0 {
            anyhow::bail!("Pagination page_min must be at least 1");
        }
        if p.per_page_min == 0 || p.per_page_min > p.per_page_max {
            anyhow::bail!(
                "Pagination per_page bounds are invalid: [{}, {}]",
                p.per_page_min,
                p.per_page_max
            );
        }
        if !(p.per_page_min..=p.per_page_max).contains(&p.per_page_default) {
            anyhow::bail!("Pagination per_page_default must lie within per_page bounds");
        }

        if self.search.enabled {
            url::Url::parse(&self.search.url).context("Invalid search URL")?;
        }

        if self.general.max_db_connections == 0 {
            anyhow::bail!("max_db_connections must be > 0");
        }

        Ok(())
    }
}

/// Generate a random token secret (64 character hex string)
#[must_use]
pub fn generate_secret_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pagination.per_page_default, 20);
        assert_eq!(config.token.secret_key.len(), 64);
        assert!(!config.search.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[token]"));
        assert!(toml_str.contains("[pagination]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [pagination]
            per_page_max = 50

            [validation]
            birthdate_min = "1950-06-01"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.pagination.per_page_max, 50);
        assert_eq!(
            config.validation.birthdate_min,
            NaiveDate::from_ymd_opt(1950, 6, 1).unwrap()
        );

        assert_eq!(config.pagination.per_page_default, 20);
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = Config::default();
        config.token.secret_key = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_page_bounds() {
        let mut config = Config::default();
        config.pagination.per_page_min = 200;
        assert!(config.validate().is_err());
    }
}
