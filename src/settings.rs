use std::time::Duration;

use config::{Config, Environment, File};
use prospera_advice::{Options, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::Deserialize;

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";
const DATA_NAME: &str = "state.json";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub data_file: String,
    pub page_size: usize,
    pub advice: Advice,
}

#[derive(Debug, Deserialize)]
pub struct Advice {
    #[serde(default)]
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Settings {
    /// Defaults, then the config file (if present), then `PROSPERA__*`
    /// environment variables.
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let path = config_path.map_or_else(default_config_path, String::from);

        Config::builder()
            .set_default("data_file", default_data_path())?
            .set_default("page_size", 20_i64)?
            .set_default("advice.endpoint", DEFAULT_ENDPOINT)?
            .set_default("advice.model", DEFAULT_MODEL)?
            .set_default("advice.timeout_secs", 20_i64)?
            .add_source(File::with_name(&path).required(config_path.is_some()))
            .add_source(Environment::with_prefix("PROSPERA").separator("__"))
            .build()?
            .try_deserialize()
    }
}

impl Advice {
    pub fn options(&self) -> Options {
        Options {
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_data_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(DATA_NAME)
        .display()
        .to_string()
}

fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
