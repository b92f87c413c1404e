use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, MonetaryAmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    TermLoan,
    RevolvingCredit,
    Syndicated,
    Bilateral,
    ProjectFinance,
    Bridge,
}

impl FacilityType {
    /// Lenient parse used for provider payloads ("Revolving Credit Facility", "RCF").
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("revolv") || lower == "rcf" {
            Some(FacilityType::RevolvingCredit)
        } else if lower.contains("syndicat") {
            Some(FacilityType::Syndicated)
        } else if lower.contains("bilateral") {
            Some(FacilityType::Bilateral)
        } else if lower.contains("project") {
            Some(FacilityType::ProjectFinance)
        } else if lower.contains("bridge") {
            Some(FacilityType::Bridge)
        } else if lower.contains("term") {
            Some(FacilityType::TermLoan)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<FacilityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub multicurrency: bool,
    /// Optional currencies; must be empty unless `multicurrency` is set.
    #[serde(default)]
    pub currencies: Vec<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<MonetaryAmount>,
}
