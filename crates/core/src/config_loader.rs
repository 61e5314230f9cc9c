use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, `config/Config.toml` and
    /// `ROLLQUEST_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a present configuration source cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Loads configuration from a specific TOML (or `.json`) file. A missing
    /// file falls back to the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or environment values cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Self::with_file(Self::base(), path.as_ref())
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    /// Loads configuration with a profile overlay (`config/Config.<profile>.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let profile_path = path.with_file_name(format!("Config.{profile}.{extension}"));

        let figment = Self::with_file(Self::base(), path);
        let config: AppConfig = Self::with_file(figment, &profile_path)
            .merge(Self::env())
            .extract()?;

        tracing::debug!(profile, "loaded configuration profile");
        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    fn with_file(figment: Figment, path: &Path) -> Figment {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        }
    }

    fn env() -> Env {
        Env::prefixed("ROLLQUEST_").split("__")
    }
}
