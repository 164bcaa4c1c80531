//! # Account Configuration
//!
//! The configuration record the host keeps for accounting, reduced to the
//! part the amount computations read.
//!
//! ## Configuration Source
//! The record is owned by the host and handed over per request through the
//! context. Hosts that keep it as JSON can use [`AccountConfiguration::from_json`].
//!
//! ```json
//! { "tax_rounding": "line" }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;

/// When accumulated tax amounts are rounded to the currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxRounding {
    /// Round the running tax totals after every line.
    Line,

    /// Round the tax totals once, after the last line.
    #[default]
    Document,
}

/// Account configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountConfiguration {
    #[serde(default)]
    pub tax_rounding: TaxRounding,
}

impl AccountConfiguration {
    /// Creates a configuration with the given tax rounding.
    pub fn with_tax_rounding(tax_rounding: TaxRounding) -> Self {
        AccountConfiguration { tax_rounding }
    }

    /// Decodes a configuration record supplied by the host as JSON.
    ///
    /// Missing keys take their defaults.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_default_rounds_per_document() {
        let config = AccountConfiguration::default();
        assert_eq!(config.tax_rounding, TaxRounding::Document);
    }

    #[test]
    fn test_from_json() {
        let config = AccountConfiguration::from_json(r#"{"tax_rounding": "line"}"#).unwrap();
        assert_eq!(config.tax_rounding, TaxRounding::Line);

        let config = AccountConfiguration::from_json("{}").unwrap();
        assert_eq!(config.tax_rounding, TaxRounding::Document);
    }

    #[test]
    fn test_from_json_rejects_unknown_rounding() {
        let err = AccountConfiguration::from_json(r#"{"tax_rounding": "invoice"}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    }
}
