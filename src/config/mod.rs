use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

const APP_DIR: &str = ".stencil-control";
const CONFIG_FILE: &str = "stencil-control.conf";
const STENCIL_DB_FILE: &str = "stencil.sqlite";
const CRED_DB_FILE: &str = "credenciales.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_stencil_database")]
    pub stencil_database: String,
    #[serde(default = "default_credentials_database")]
    pub credentials_database: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of production lines shown on the dashboard.
    #[serde(default = "default_lines")]
    pub lines: u32,
    /// Target duration of a stencil cycle, in hours.
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: i64,
    #[serde(default)]
    pub tension_min: f64,
    #[serde(default = "default_tension_max")]
    pub tension_max: f64,
    #[serde(default = "default_tension_supervisor")]
    pub tension_supervisor: String,
    /// "*" or a comma separated list of allowed origins. Empty means localhost only.
    #[serde(default)]
    pub cors_origins: String,
    /// Directory holding a built dashboard to serve as static files.
    #[serde(default)]
    pub static_dir: Option<String>,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_stencil_database() -> String {
    Config::config_dir()
        .join(STENCIL_DB_FILE)
        .to_string_lossy()
        .to_string()
}
fn default_credentials_database() -> String {
    Config::config_dir()
        .join(CRED_DB_FILE)
        .to_string_lossy()
        .to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8564
}
fn default_lines() -> u32 {
    4
}
fn default_hours() -> u32 {
    8
}
fn default_jwt_secret() -> String {
    "dev-secret-change-me".to_string()
}
fn default_jwt_ttl_hours() -> i64 {
    12
}
fn default_tension_max() -> f64 {
    100.0
}
fn default_tension_supervisor() -> String {
    "SUPERVISOR".to_string()
}
fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stencil_database: default_stencil_database(),
            credentials_database: default_credentials_database(),
            host: default_host(),
            port: default_port(),
            lines: default_lines(),
            hours: default_hours(),
            jwt_secret: default_jwt_secret(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
            tension_min: 0.0,
            tension_max: default_tension_max(),
            tension_supervisor: default_tension_supervisor(),
            cors_origins: String::new(),
            static_dir: None,
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Load configuration from the standard file (defaults when absent),
    /// then apply environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut cfg = Self::load_from(&Self::config_file())?;
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from a specific YAML file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Environment variables win over the file, matching the deployment `.env`.
    pub fn apply_env(&mut self) {
        override_from_env("STENCIL_DB", &mut self.stencil_database);
        override_from_env("CRED_DB", &mut self.credentials_database);
        override_from_env("PORT", &mut self.port);
        override_from_env("LINES", &mut self.lines);
        override_from_env("HOURS", &mut self.hours);
        override_from_env("JWT_SECRET", &mut self.jwt_secret);
        override_from_env("TENSION_MIN", &mut self.tension_min);
        override_from_env("TENSION_MAX", &mut self.tension_max);
        override_from_env("TENSION_SUPERVISOR", &mut self.tension_supervisor);
        override_from_env("CORS_ORIGINS", &mut self.cors_origins);

        if let Ok(dir) = env::var("STATIC_DIR")
            && !dir.trim().is_empty()
        {
            self.static_dir = Some(dir);
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.lines == 0 {
            return Err(AppError::Config("lines must be at least 1".into()));
        }
        if self.hours == 0 {
            return Err(AppError::Config("hours must be at least 1".into()));
        }
        if self.jwt_ttl_hours <= 0 {
            return Err(AppError::Config("jwt_ttl_hours must be positive".into()));
        }
        Ok(())
    }

    /// Target cycle duration in milliseconds.
    pub fn target_ms(&self) -> i64 {
        i64::from(self.hours) * 3600 * 1000
    }

    /// Write the configuration file (unless `is_test`) and make sure both
    /// database files exist.
    pub fn init_all(
        stencil_db: Option<String>,
        cred_db: Option<String>,
        is_test: bool,
    ) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let mut config = if is_test {
            Self::default()
        } else {
            Self::load_from(&Self::config_file())?
        };

        if let Some(p) = stencil_db {
            config.stencil_database = resolve_in(&dir, &p);
        }
        if let Some(p) = cred_db {
            config.credentials_database = resolve_in(&dir, &p);
        }

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        for db in [&config.stencil_database, &config.credentials_database] {
            let path = Path::new(db);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            if !path.exists() {
                fs::File::create(path)?;
            }
        }

        Ok(config)
    }
}

fn resolve_in(dir: &Path, name: &str) -> String {
    let p = Path::new(name);
    if p.is_absolute() {
        p.to_string_lossy().to_string()
    } else {
        dir.join(p).to_string_lossy().to_string()
    }
}

fn override_from_env<T>(key: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => {
            info!("{key} set from environment");
            *slot = v;
        }
        Err(e) => warn!("Invalid {key} value, keeping configured one: {e}"),
    }
}
