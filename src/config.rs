use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};

use crate::pricing::DEFAULT_FALLBACK_RATE;

/// Configuration for the Procura server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Directory receiving the JSON log files
    pub log_dir: String,
    /// Rate to FCFA used when no exchange rate is stored
    pub fallback_exchange_rate: f64,
    /// Name of the supplier record brokered prices are attached to
    pub broker_supplier_name: String,
    /// Base URL of the chat-completions API
    pub ai_base_url: String,
    /// Model requested from the completion API
    pub ai_model: String,
    /// API key for the completion API; completion routes fail without it
    #[serde(default, skip_serializing)]
    pub ai_api_key: Option<String>,
    /// Timeout of a completion call in seconds
    pub ai_timeout_seconds: u64,
    /// Sampling temperature sent with every completion call
    pub ai_temperature: f32,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub fallback_exchange_rate: Option<f64>,
    #[serde(default)]
    pub broker_supplier_name: Option<String>,
    #[serde(default)]
    pub ai_base_url: Option<String>,
    #[serde(default)]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub ai_api_key: Option<String>,
    #[serde(default)]
    pub ai_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub ai_temperature: Option<f32>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "procura", about = "Procurement and quotation brokerage server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind to
    #[clap(long, env = "PROCURA_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Port to listen on
    #[clap(long, env = "PROCURA_PORT")]
    pub port: Option<u16>,

    /// Directory for log files
    #[clap(long, env = "PROCURA_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Exchange rate to FCFA used when none is stored
    #[clap(long, env = "PROCURA_FALLBACK_EXCHANGE_RATE")]
    pub fallback_exchange_rate: Option<f64>,

    /// Supplier name brokered prices are recorded under
    #[clap(long, env = "PROCURA_BROKER_SUPPLIER_NAME")]
    pub broker_supplier_name: Option<String>,

    /// Base URL of the completion API
    #[clap(long, env = "PROCURA_AI_BASE_URL")]
    pub ai_base_url: Option<String>,

    /// Completion model
    #[clap(long, env = "PROCURA_AI_MODEL")]
    pub ai_model: Option<String>,

    /// Completion API key
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,

    /// Completion timeout in seconds
    #[clap(long, env = "PROCURA_AI_TIMEOUT_SECONDS")]
    pub ai_timeout_seconds: Option<u64>,

    /// Completion sampling temperature
    #[clap(long, env = "PROCURA_AI_TEMPERATURE")]
    pub ai_temperature: Option<f32>,

    /// Debug mode
    #[clap(long, env = "PROCURA_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            port: update.port.unwrap_or(self.port),
            log_dir: update.log_dir.unwrap_or(self.log_dir),
            fallback_exchange_rate: update
                .fallback_exchange_rate
                .unwrap_or(self.fallback_exchange_rate),
            broker_supplier_name: update.broker_supplier_name.unwrap_or(self.broker_supplier_name),
            ai_base_url: update.ai_base_url.unwrap_or(self.ai_base_url),
            ai_model: update.ai_model.unwrap_or(self.ai_model),
            ai_api_key: update.ai_api_key.or(self.ai_api_key),
            ai_timeout_seconds: update.ai_timeout_seconds.unwrap_or(self.ai_timeout_seconds),
            ai_temperature: update.ai_temperature.unwrap_or(self.ai_temperature),
        }
    }

    /// Returns the completion timeout as a Duration
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_seconds)
    }

    /// The `address:port` the server listens on
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let (database_url, log_dir) = match config_path {
        Some(path) => (
            path.join("procura.db").to_string_lossy().to_string(),
            path.join("logs").to_string_lossy().to_string(),
        ),
        None => ("procura.db".to_string(), "logs".to_string()),
    };

    Config {
        database_url,
        bind_address: "0.0.0.0".to_string(),
        port: 3000,
        log_dir,
        fallback_exchange_rate: DEFAULT_FALLBACK_RATE,
        broker_supplier_name: "Procura Sourcing".to_string(),
        ai_base_url: "https://api.openai.com/v1".to_string(),
        ai_model: "gpt-4o-mini".to_string(),
        ai_api_key: None,
        ai_timeout_seconds: 30,
        ai_temperature: 0.2,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        port: args.port,
        log_dir: args.log_dir,
        fallback_exchange_rate: args.fallback_exchange_rate,
        broker_supplier_name: args.broker_supplier_name,
        ai_base_url: args.ai_base_url,
        ai_model: args.ai_model,
        ai_api_key: args.ai_api_key,
        ai_timeout_seconds: args.ai_timeout_seconds,
        ai_temperature: args.ai_temperature,
    }
}

/// The XDG config directory of the application, when it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let path = match ProjectDirs::from("com", "procura", "procura") {
        Some(proj_dirs) => PathBuf::from(proj_dirs.config_dir()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            return None;
        }
    };

    if !path.exists() {
        info!("Config path not found at {:?}, using defaults", path);
        return None;
    }
    Some(path)
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_path = get_config_dir_path();
    let base = base_config(config_path.clone());

    let config = base
        .apply_update(
            config_from_file(config_path.map(|p| p.join("config.toml"))).unwrap_or_default(),
        )
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, listen={}, log_dir={}, fallback_rate={}, ai_model={}, ai_temperature={}, ai_key_set={}",
        config.database_url,
        config.listen_address(),
        config.log_dir,
        config.fallback_exchange_rate,
        config.ai_model,
        config.ai_temperature,
        config.ai_api_key.is_some()
    );

    config
}


#[cfg(test)]
mod prop_tests;
