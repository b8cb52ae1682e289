//! Engine configuration.
//!
//! Defaults match the behaviour of the document editors: INR home currency,
//! four-digit sequences, new rows of `1 Nos @ 18%`.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::DocketError;

/// Environment variable prefix, e.g. `DOCKET_HOME_CURRENCY=USD`.
pub const ENV_PREFIX: &str = "DOCKET";

/// Tunables shared by every document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ISO 4217 code that totals are computed in.
    pub home_currency: String,
    /// Minimum zero-padded width of the sequence part of a document number.
    pub sequence_width: usize,
    /// Unit of a freshly appended row.
    pub default_unit: String,
    /// GST percentage of a freshly appended row.
    pub default_gst_rate: u32,
    /// Quantity of a freshly appended row.
    pub default_quantity: u32,
    /// How many numbers a draft tries before giving up on a uniqueness conflict.
    pub max_allocation_attempts: u32,
    /// Upper bound on rows per document.
    pub max_line_items: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            home_currency: "INR".to_string(),
            sequence_width: 4,
            default_unit: "Nos".to_string(),
            default_gst_rate: 18,
            default_quantity: 1,
            max_allocation_attempts: 3,
            max_line_items: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load from an optional TOML/YAML/JSON file, then `DOCKET_*` environment
    /// variables. Missing keys keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, DocketError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DocketError::Config(e.to_string()))?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot work with.
    pub fn check(&self) -> Result<(), DocketError> {
        if self.home_currency.len() != 3 {
            return Err(DocketError::Config(format!(
                "home_currency '{}' must be a 3-letter ISO 4217 code",
                self.home_currency
            )));
        }
        if self.sequence_width == 0 || self.sequence_width > 12 {
            return Err(DocketError::Config(format!(
                "sequence_width {} must be between 1 and 12",
                self.sequence_width
            )));
        }
        if self.default_gst_rate > 100 {
            return Err(DocketError::Config(format!(
                "default_gst_rate {} must not exceed 100",
                self.default_gst_rate
            )));
        }
        if self.max_allocation_attempts == 0 {
            return Err(DocketError::Config(
                "max_allocation_attempts must be at least 1".into(),
            ));
        }
        if self.max_line_items == 0 {
            return Err(DocketError::Config("max_line_items must be at least 1".into()));
        }
        Ok(())
    }

    pub fn default_gst(&self) -> Decimal {
        Decimal::from(self.default_gst_rate)
    }

    pub fn default_qty(&self) -> Decimal {
        Decimal::from(self.default_quantity)
    }

    /// True when `code` names the home currency (case-insensitive).
    pub fn is_home_currency(&self, code: &str) -> bool {
        code.eq_ignore_ascii_case(&self.home_currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_check() {
        let cfg = EngineConfig::default();
        assert!(cfg.check().is_ok());
        assert_eq!(cfg.default_gst(), Decimal::from(18));
        assert!(cfg.is_home_currency("inr"));
    }

    #[test]
    fn rejects_bad_currency() {
        let cfg = EngineConfig {
            home_currency: "RUPEE".into(),
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.check(), Err(DocketError::Config(_))));
    }

    #[test]
    fn rejects_zero_attempts() {
        let cfg = EngineConfig {
            max_allocation_attempts: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.check().is_err());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let cfg = EngineConfig::load(None).unwrap();
        assert_eq!(cfg.sequence_width, 4);
    }
}
