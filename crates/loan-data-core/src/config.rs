//! Tunables for the scorer, standardizer and exporter.
//!
//! Plain values passed into each operation; nothing here is global.

use serde::{Deserialize, Serialize};

/// Per-field weights for extraction confidence scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfidenceWeights {
    pub loan_amount: u8,
    pub interest_rate: u8,
    pub borrower: u8,
    pub lender: u8,
    pub term: u8,
    pub covenants: u8,
    pub fees: u8,
    pub maturity_date: u8,
    /// Ceiling for automated scores. 100 means human-verified and is never produced.
    pub cap: u8,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            loan_amount: 20,
            interest_rate: 20,
            borrower: 15,
            lender: 15,
            term: 10,
            covenants: 10,
            fees: 5,
            maturity_date: 5,
            cap: 99,
        }
    }
}

/// Score reserved for records a human has verified.
pub const HUMAN_VERIFIED_CONFIDENCE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConfig {
    /// Allowed gap between `months` and `years * 12` before a warning is raised.
    pub term_tolerance_months: u32,
    /// Source-system tag stamped on records that arrive without one.
    pub default_source_system: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            term_tolerance_months: 1,
            default_source_system: "manual".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub pretty_json: bool,
    /// Decimal places for the rate column of summary exports.
    pub rate_decimal_places: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            rate_decimal_places: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_above_cap() {
        let w = ConfidenceWeights::default();
        let total: u32 = [
            w.loan_amount,
            w.interest_rate,
            w.borrower,
            w.lender,
            w.term,
            w.covenants,
            w.fees,
            w.maturity_date,
        ]
        .iter()
        .map(|v| *v as u32)
        .sum();
        assert_eq!(total, 100);
        assert!(w.cap < HUMAN_VERIFIED_CONFIDENCE);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: ValidationConfig =
            serde_json::from_value(serde_json::json!({"termToleranceMonths": 3})).unwrap();
        assert_eq!(cfg.term_tolerance_months, 3);
        assert_eq!(cfg.default_source_system, "manual");
    }
}
