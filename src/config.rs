//! Config module contains the top-level config for the app.
use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};
use validator::{Validate, ValidationErrors};

use errors::Error;
use filters::FilterScope;
use models::validation_rules::*;

/// Basic settings - catalog data, slider behaviour, local storage and pages
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: Catalog,
    pub slider: Slider,
    pub storage: Storage,
    pub pages: Vec<Page>,
}

/// File-backed product source settings
#[derive(Debug, Deserialize, Clone)]
pub struct Catalog {
    pub data_dir: String,
    pub thread_count: usize,
}

/// Price slider settings
#[derive(Debug, Deserialize, Clone)]
pub struct Slider {
    pub step: f64,
    pub debounce_ms: u64,
    pub track_width: f64,
}

impl Validate for Slider {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_positive(self.step) {
            errors.add("step", e);
        }
        if let Err(e) = validate_positive(self.track_width) {
            errors.add("track_width", e);
        }
        if let Err(e) = validate_range_u64(self.debounce_ms, 1, 10_000) {
            errors.add("debounce_ms", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Local single-device store for favorites and cart
#[derive(Debug, Deserialize, Clone)]
pub struct Storage {
    pub local_path: String,
}

/// Category page: the collection it shows and the attributes it filters by
#[derive(Debug, Deserialize, Clone)]
pub struct Page {
    pub name: String,
    pub collection: String,
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
    #[serde(default)]
    pub excluded: Vec<String>,
}

impl Page {
    pub fn scope(&self) -> FilterScope {
        match self.attributes {
            Some(ref attributes) => FilterScope::Only(attributes.clone()),
            None => FilterScope::Except(self.excluded.clone()),
        }
    }
}

impl Config {
    /// Creates config from base.toml, which are overwritten by <env>.toml, where env is one of dev,
    /// test, production. After that it could be overwritten by env variables like STQ_STOREFRONT_CATALOG.
    pub fn new() -> Result<Self, ConfigError> {
        // Optional file specific for environment
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Config::with_env(env)
    }

    pub fn with_env(env: impl Into<String>) -> Result<Self, ConfigError> {
        let mut s = RawConfig::new();

        s.merge(File::with_name("config/base"))?;
        s.merge(File::with_name(&format!("config/{}", env.into())).required(false))?;
        s.merge(Environment::with_prefix("STQ_STOREFRONT"))?;

        let config: Config = s.try_into()?;
        config
            .slider
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid slider settings. {}", Error::Validate(e))))?;
        Ok(config)
    }

    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.name == name)
    }
}
