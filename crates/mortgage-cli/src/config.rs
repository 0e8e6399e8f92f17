//! `mortgage.toml` loading.
//!
//! Precedence: command-line flags, then the config file, then built-in
//! defaults.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "mortgage.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(String),

    #[error("Invalid discount rate {0}: must be greater than -100%")]
    InvalidDiscountRate(Decimal),

    #[error("Invalid payback threshold: must be at least 1 month")]
    InvalidPaybackThreshold,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Annual rate for NPV. Falls back to the scenario's own rate.
    #[serde(deserialize_with = "deserialize_rate")]
    pub discount_rate_annual: Option<Decimal>,
    pub payback_threshold_months: u32,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            discount_rate_annual: None,
            payback_threshold_months: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub out_dir: PathBuf,
    pub delimiter: String,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
            delimiter: ";".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MortgageConfig {
    pub analysis: AnalysisSection,
    pub export: ExportSection,
}

/// Rates may be written as TOML floats or as quoted decimals.
fn deserialize_rate<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Text(s)) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(Raw::Number(n)) => Decimal::from_f64(n)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("rate {n} is not representable"))),
    }
}

impl MortgageConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: MortgageConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// An explicit path must exist; the default `mortgage.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rate) = self.analysis.discount_rate_annual {
            if rate <= Decimal::NEGATIVE_ONE {
                return Err(ConfigError::InvalidDiscountRate(rate));
            }
        }
        if self.analysis.payback_threshold_months == 0 {
            return Err(ConfigError::InvalidPaybackThreshold);
        }
        self.delimiter_byte()?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        parse_delimiter(&self.export.delimiter)
    }
}

/// `\t` and `tab` are accepted for tab-separated output.
pub fn parse_delimiter(s: &str) -> Result<u8, ConfigError> {
    match s {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    let bytes = s.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii() {
        Ok(bytes[0])
    } else {
        Err(ConfigError::InvalidDelimiter(s.to_string()))
    }
}
