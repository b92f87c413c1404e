use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{bps_to_rate, Bps, MonetaryAmount, Rate};

/// Reference rate the margin is quoted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BaseRate {
    Sofr,
    Sonia,
    Euribor,
    Estr,
    Tonar,
    Saron,
    Libor,
    Prime,
    Fixed,
    Other,
}

impl BaseRate {
    /// Lenient parse used for provider payloads ("Term SOFR", "euribor 3m").
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return None;
        }
        let rate = if upper.contains("SOFR") {
            BaseRate::Sofr
        } else if upper.contains("SONIA") {
            BaseRate::Sonia
        } else if upper.contains("EURIBOR") {
            BaseRate::Euribor
        } else if upper.contains("ESTR") || upper.contains("€STR") {
            BaseRate::Estr
        } else if upper.contains("TONA") {
            BaseRate::Tonar
        } else if upper.contains("SARON") {
            BaseRate::Saron
        } else if upper.contains("LIBOR") {
            BaseRate::Libor
        } else if upper.contains("PRIME") {
            BaseRate::Prime
        } else if upper.contains("FIXED") {
            BaseRate::Fixed
        } else {
            BaseRate::Other
        };
        Some(rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCountConvention {
    #[serde(rename = "ACT/360")]
    Act360,
    #[serde(rename = "ACT/365")]
    Act365,
    #[serde(rename = "30/360")]
    Thirty360,
    #[serde(rename = "ACT/ACT")]
    ActAct,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_rate: Option<BaseRate>,
    /// Current fixing of the base rate, as a decimal fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_rate_value: Option<Rate>,
    /// Margin over the base rate in basis points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Bps>,
    /// Base fixing plus margin, as a decimal fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_in_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_count: Option<DayCountConvention>,
}

impl Pricing {
    /// All-in rate: the stated value, otherwise fixing + margin when both are known.
    pub fn effective_all_in_rate(&self) -> Option<Rate> {
        self.all_in_rate.or_else(|| match (self.base_rate_value, self.margin) {
            (Some(base), Some(margin)) => Some(base + bps_to_rate(margin)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    /// Signing / origination date, when stated in the agreement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origination_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTerms {
    pub amount: MonetaryAmount,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub term: Term,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_all_in_rate_from_components() {
        let pricing = Pricing {
            base_rate: Some(BaseRate::Sofr),
            base_rate_value: Some(dec!(0.053)),
            margin: Some(dec!(275)),
            ..Default::default()
        };
        assert_eq!(pricing.effective_all_in_rate(), Some(dec!(0.0805)));
    }

    #[test]
    fn test_stated_all_in_rate_wins() {
        let pricing = Pricing {
            base_rate_value: Some(dec!(0.05)),
            margin: Some(dec!(100)),
            all_in_rate: Some(dec!(0.07)),
            ..Default::default()
        };
        assert_eq!(pricing.effective_all_in_rate(), Some(dec!(0.07)));
    }

    #[test]
    fn test_base_rate_loose_parse() {
        assert_eq!(BaseRate::parse_loose("Term SOFR"), Some(BaseRate::Sofr));
        assert_eq!(BaseRate::parse_loose("euribor 3m"), Some(BaseRate::Euribor));
        assert_eq!(BaseRate::parse_loose("CDOR"), Some(BaseRate::Other));
        assert_eq!(BaseRate::parse_loose("  "), None);
    }

    #[test]
    fn test_day_count_wire_names() {
        let json = serde_json::to_string(&DayCountConvention::Act360).unwrap();
        assert_eq!(json, "\"ACT/360\"");
    }
}
