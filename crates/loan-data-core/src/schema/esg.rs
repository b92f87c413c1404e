use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::covenants::TestingFrequency;
use crate::types::Bps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EsgFramework {
    /// LMA/LSTA/APLMA Sustainability-Linked Loan Principles.
    SustainabilityLinkedLoanPrinciples,
    GreenLoanPrinciples,
    SocialLoanPrinciples,
    EuTaxonomy,
    Other,
}

impl EsgFramework {
    pub fn parse_loose(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("sustainability") || lower.contains("sllp") {
            EsgFramework::SustainabilityLinkedLoanPrinciples
        } else if lower.contains("green") || lower.contains("glp") {
            EsgFramework::GreenLoanPrinciples
        } else if lower.contains("social") {
            EsgFramework::SocialLoanPrinciples
        } else if lower.contains("taxonomy") {
            EsgFramework::EuTaxonomy
        } else {
            EsgFramework::Other
        }
    }
}

/// Margin ratchet attached to a KPI. Improvement is a step-down (<= 0),
/// deterioration a step-up (>= 0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingAdjustment {
    pub improvement_bps: Bps,
    pub deterioration_bps: Bps,
}

impl PricingAdjustment {
    pub fn is_well_signed(&self) -> bool {
        self.improvement_bps <= Decimal::ZERO && self.deterioration_bps >= Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsgKpi {
    pub metric: String,
    pub baseline: Decimal,
    pub target: Decimal,
    pub unit: String,
    pub testing_frequency: TestingFrequency,
    #[serde(default)]
    pub pricing_adjustment: PricingAdjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseOfProceeds {
    Green,
    Social,
    Sustainability,
    Transition,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsgProvisions {
    pub sustainability_linked: bool,
    pub framework: EsgFramework,
    #[serde(default)]
    pub kpis: Vec<EsgKpi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_of_proceeds: Option<UseOfProceeds>,
    pub reporting_frequency: TestingFrequency,
    #[serde(default)]
    pub verification_required: bool,
    /// External ESG rating on a 0–100 scale, when one is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Decimal>,
}
