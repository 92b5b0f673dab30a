//! Command-line configuration.
//!
//! Settings are layered: built-in defaults (Dublin, Ohio), then an optional
//! TOML file, then command-line overrides.
//!
//! ```toml
//! log_level = "info"
//! log_file = "municipal-tax.log"
//!
//! [tax]
//! municipality = "Dublin"
//! tax_rate = "0.02"
//! de_minimis_threshold = "10.00"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::Amount;
use tax_core::calculations::MunicipalTaxConfig;
use tracing::debug;

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub tax: MunicipalTaxConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            tax: MunicipalTaxConfig::default(),
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tax_rate: Option<Decimal>,
    pub threshold: Option<Amount>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml(document: &str) -> Result<Self> {
        toml::from_str(document).context("invalid config document")
    }

    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::from_toml(&document)
            .with_context(|| format!("in config file '{}'", path.display()))
    }

    /// Applies command-line overrides and checks the tax parameters.
    pub fn with_overrides(
        mut self,
        overrides: Overrides,
    ) -> Result<Self> {
        if let Some(rate) = overrides.tax_rate {
            self.tax.tax_rate = rate;
        }
        if let Some(threshold) = overrides.threshold {
            self.tax.de_minimis_threshold = threshold;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }

        self.tax
            .validate()
            .context("invalid tax configuration")?;
        debug!(config = ?self, "configuration resolved");
        Ok(self)
    }
}
