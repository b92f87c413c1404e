//! Partially-populated loan record accepted by the standardizer.
//!
//! Everything is optional so manual entry, extraction output and
//! re-imported canonical records all fit the same shape. The mapping into
//! `StandardizedLoanData` lives in the parent module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{
    Covenants, DataStandard, Documentation, EsgProvisions, FacilityDetails, FeeCharge, FeeStructure,
    FeeType, Interoperability, Lender, Lifecycle, Party, Pricing, RegulatoryInfo, Security,
    StandardizedLoanData, Term,
};
use crate::types::{CurrencyCode, Money, Rate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialBorrower {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_rating: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialAmount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
}

/// Fee as entered: amount and percentage are both optional here and the
/// standardizer enforces that exactly one is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFee {
    #[serde(rename = "type")]
    pub fee_type: FeeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<FeeStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Rate>,
    /// Falls back to the loan currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialLoanRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Version of the record this input was derived from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Timestamp of that version; the re-standardized record never predates it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_standard: Option<DataStandard>,
    pub borrower: PartialBorrower,
    /// Single lender of record; placed ahead of `lenders` when both are given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender: Option<Lender>,
    pub lenders: Vec<Lender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Party>,
    pub arrangers: Vec<Party>,
    pub amount: PartialAmount,
    pub pricing: Pricing,
    pub term: Term,
    pub facility: FacilityDetails,
    pub covenants: Covenants,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    pub fees: Vec<PartialFee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esg: Option<EsgProvisions>,
    pub regulatory: RegulatoryInfo,
    pub documentation: Documentation,
    pub lifecycle: Lifecycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interoperability: Option<Interoperability>,
}

impl PartialLoanRecord {
    /// Lender of record followed by the remaining lenders.
    pub fn all_lenders(&self) -> Vec<Lender> {
        self.lender
            .iter()
            .chain(self.lenders.iter())
            .cloned()
            .collect()
    }
}

impl From<&StandardizedLoanData> for PartialLoanRecord {
    fn from(record: &StandardizedLoanData) -> Self {
        let parties = &record.parties;
        let borrower = &parties.borrower;
        Self {
            id: Some(record.id.clone()),
            version: Some(record.version),
            last_updated: Some(record.last_updated),
            data_standard: Some(record.data_standard),
            borrower: PartialBorrower {
                name: Some(borrower.name.clone()),
                entity_id: borrower.entity_id.clone(),
                jurisdiction: borrower.jurisdiction.clone(),
                sector: borrower.sector.clone(),
                credit_rating: borrower.credit_rating.clone(),
            },
            lender: None,
            lenders: parties.lenders.clone(),
            agent: parties.agent.clone(),
            arrangers: parties.arrangers.clone(),
            amount: PartialAmount {
                value: Some(record.financial_terms.amount.value),
                currency: Some(record.financial_terms.amount.currency.clone()),
            },
            pricing: record.financial_terms.pricing.clone(),
            term: record.financial_terms.term.clone(),
            facility: record.facility.clone(),
            covenants: record.covenants.clone(),
            security: record.security.clone(),
            fees: record
                .fees
                .iter()
                .map(|f| PartialFee {
                    fee_type: f.fee_type,
                    structure: Some(f.structure),
                    amount: f.charge.amount(),
                    percentage: f.charge.percentage(),
                    currency: Some(f.currency.clone()),
                    payment_timing: f.payment_timing.clone(),
                    description: f.description.clone(),
                })
                .collect(),
            esg: record.esg.clone(),
            regulatory: record.regulatory.clone(),
            documentation: record.documentation.clone(),
            lifecycle: record.lifecycle.clone(),
            interoperability: Some(record.interoperability.clone()),
        }
    }
}

impl PartialFee {
    /// The charge, when exactly one of amount or percentage is set.
    pub fn charge(&self) -> Option<FeeCharge> {
        match (self.amount, self.percentage) {
            (Some(a), None) => Some(FeeCharge::Amount(a)),
            (None, Some(p)) => Some(FeeCharge::Percentage(p)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction mapping
// ---------------------------------------------------------------------------

#[cfg(feature = "extraction")]
mod from_extraction {
    use rust_decimal::Decimal;

    use super::*;
    use crate::extraction::contract::{
        CovenantCategory, ExtractedCovenant, ExtractedEsgProvisions, ExtractedLoanTerms,
    };
    use crate::schema::{
        BaseRate, ComparisonOperator, EsgFramework, EsgKpi, FacilityType, FinancialCovenant,
        FinancialCovenantStatus, FinancialCovenantType, LenderType, OperationalCovenant,
        OperationalCovenantStatus, OperationalCovenantType, PricingAdjustment, ReportingCovenant,
        ReportingCovenantType, ReportingStatus, TestingFrequency, Threshold, UseOfProceeds,
    };

    impl PartialLoanRecord {
        /// Map provider output into a standardizer input.
        ///
        /// The id is supplied by the caller; extraction never invents one.
        /// Fees with neither an amount nor a percentage are dropped.
        pub fn from_extraction(id: Option<String>, terms: &ExtractedLoanTerms) -> Self {
            let mut record = PartialLoanRecord {
                id,
                borrower: PartialBorrower {
                    name: terms.borrower.clone(),
                    jurisdiction: terms
                        .regulatory_data
                        .as_ref()
                        .and_then(|r| r.jurisdiction.clone()),
                    ..Default::default()
                },
                lender: terms.lender.as_ref().map(|name| Lender {
                    name: name.clone(),
                    entity_id: None,
                    lender_type: LenderType::Bank,
                }),
                amount: PartialAmount {
                    value: terms.loan_amount,
                    currency: terms.currency.clone(),
                },
                pricing: Pricing {
                    base_rate: terms.base_rate.as_deref().and_then(BaseRate::parse_loose),
                    margin: terms.margin,
                    all_in_rate: terms.interest_rate,
                    ..Default::default()
                },
                term: Term {
                    months: terms.term_months,
                    maturity_date: terms.maturity_date,
                    ..Default::default()
                },
                facility: FacilityDetails {
                    facility_type: terms.facility_type.as_deref().and_then(FacilityType::parse_loose),
                    purpose: terms.purpose.clone(),
                    ..Default::default()
                },
                covenants: map_covenants(&terms.covenants),
                fees: terms
                    .fees
                    .iter()
                    .filter(|f| f.amount.is_some() || f.percentage.is_some())
                    .map(|f| {
                        let fee_type = FeeType::parse_loose(&f.fee_type);
                        PartialFee {
                            fee_type,
                            structure: Some(fee_type.default_structure()),
                            amount: f.amount,
                            // amount wins when a provider reports both
                            percentage: if f.amount.is_some() { None } else { f.percentage },
                            currency: f.currency.clone(),
                            payment_timing: f.payment_timing.clone(),
                            description: f.description.clone(),
                        }
                    })
                    .collect(),
                esg: terms.esg_provisions.as_ref().map(map_esg),
                ..Default::default()
            };

            if let Some(reg) = &terms.regulatory_data {
                record.regulatory = RegulatoryInfo {
                    jurisdiction: reg.jurisdiction.clone(),
                    governing_law: None,
                    applicable_regulations: reg.applicable_regulations.clone(),
                    basel_risk_weight: reg.risk_weighting,
                    capital_requirement: reg.capital_requirement,
                    reporting_requirements: reg.reporting_requirements.clone(),
                };
            }
            record
        }
    }

    fn map_covenants(extracted: &[ExtractedCovenant]) -> Covenants {
        let mut covenants = Covenants::default();
        for (i, c) in extracted.iter().enumerate() {
            let frequency = c
                .testing_frequency
                .as_deref()
                .and_then(TestingFrequency::parse_loose);
            match c.category {
                CovenantCategory::Financial => {
                    let kind = FinancialCovenantType::parse_loose(&c.covenant_type);
                    covenants.financial.push(FinancialCovenant {
                        id: format!("fin-{}", i + 1),
                        covenant_type: kind,
                        description: c.description.clone(),
                        threshold: c.threshold.map(|value| Threshold {
                            value,
                            operator: c
                                .operator
                                .as_deref()
                                .and_then(parse_operator)
                                .unwrap_or_else(|| default_operator(kind)),
                            unit: c.unit.clone().unwrap_or_else(|| "x".to_string()),
                        }),
                        testing_frequency: frequency.unwrap_or(TestingFrequency::Quarterly),
                        testing_dates: Vec::new(),
                        status: FinancialCovenantStatus::Compliant,
                        last_test_date: None,
                        next_test_date: c.next_test_date,
                    });
                }
                CovenantCategory::Operational => {
                    covenants.operational.push(OperationalCovenant {
                        id: format!("ops-{}", i + 1),
                        covenant_type: OperationalCovenantType::parse_loose(&c.covenant_type),
                        description: c.description.clone(),
                        status: OperationalCovenantStatus::Active,
                    });
                }
                CovenantCategory::Reporting => {
                    covenants.reporting.push(ReportingCovenant {
                        id: format!("rep-{}", i + 1),
                        covenant_type: ReportingCovenantType::parse_loose(&c.covenant_type),
                        frequency: frequency.unwrap_or(TestingFrequency::Quarterly),
                        deadline_days: 0,
                        status: ReportingStatus::Current,
                    });
                }
            }
        }
        covenants
    }

    fn parse_operator(raw: &str) -> Option<ComparisonOperator> {
        serde_json::from_value(serde_json::Value::String(raw.trim().to_string())).ok()
    }

    /// Maximum tests for leverage-style ratios, minimum tests otherwise.
    fn default_operator(kind: FinancialCovenantType) -> ComparisonOperator {
        match kind {
            FinancialCovenantType::Leverage
            | FinancialCovenantType::LoanToValue
            | FinancialCovenantType::Capex => ComparisonOperator::AtMost,
            _ => ComparisonOperator::AtLeast,
        }
    }

    fn map_esg(esg: &ExtractedEsgProvisions) -> EsgProvisions {
        EsgProvisions {
            sustainability_linked: esg.sustainability_linked,
            framework: esg
                .framework
                .as_deref()
                .map(EsgFramework::parse_loose)
                .unwrap_or(EsgFramework::Other),
            kpis: esg
                .kpis
                .iter()
                .map(|k| EsgKpi {
                    metric: k.metric.clone(),
                    baseline: k.baseline.unwrap_or(Decimal::ZERO),
                    target: k.target.unwrap_or(Decimal::ZERO),
                    unit: k.unit.clone().unwrap_or_default(),
                    testing_frequency: TestingFrequency::Annually,
                    pricing_adjustment: PricingAdjustment {
                        improvement_bps: k.improvement_bps.unwrap_or(Decimal::ZERO),
                        deterioration_bps: k.deterioration_bps.unwrap_or(Decimal::ZERO),
                    },
                })
                .collect(),
            use_of_proceeds: esg.use_of_proceeds.as_deref().and_then(parse_use_of_proceeds),
            reporting_frequency: TestingFrequency::Annually,
            verification_required: esg.verification_required,
            score: None,
        }
    }

    fn parse_use_of_proceeds(raw: &str) -> Option<UseOfProceeds> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.is_empty() {
            None
        } else if lower.contains("green") {
            Some(UseOfProceeds::Green)
        } else if lower.contains("social") {
            Some(UseOfProceeds::Social)
        } else if lower.contains("sustainab") {
            Some(UseOfProceeds::Sustainability)
        } else if lower.contains("transition") {
            Some(UseOfProceeds::Transition)
        } else {
            Some(UseOfProceeds::General)
        }
    }
}
