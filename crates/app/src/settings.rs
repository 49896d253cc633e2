//! Layered settings: `centime.toml` (optional) overridden by
//! `CENTIME__`-prefixed environment variables.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Conversion-rate table handed to the engine; `from`/`to` are
    /// currency codes, `rate` the new-per-old multiplier.
    #[serde(default)]
    pub rates: Vec<RateEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RateEntry {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("centime").required(false))
            .add_source(Environment::with_prefix("CENTIME").separator("__"))
            .build()?
            .try_deserialize()
    }
}
