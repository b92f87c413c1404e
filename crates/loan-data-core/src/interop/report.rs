//! Interoperability / compatibility report.
//!
//! Presence checks only: a standard is "compatible" when the fields it
//! maps are populated. No external registry is consulted.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{DataStandard, ExportFormat, StandardizedLoanData};
use crate::standardizer::is_currency_code;

/// Standards the matrix is computed over, in report order.
pub const REPORT_STANDARDS: [&str; 7] = [
    "LMA",
    "LSTA",
    "APLMA",
    "Basel III",
    "ISO 20022",
    "GLEIF LEI",
    "SLLP",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCompatibility {
    pub standard: String,
    pub compatible: bool,
    /// Dotted paths of fields the standard needs but the record lacks.
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteroperabilityReport {
    pub loan_id: String,
    pub data_standard: DataStandard,
    pub compatibility: Vec<StandardCompatibility>,
    /// Share of standards the record is compatible with, 0–100.
    pub compatibility_score: Decimal,
    pub mapping_issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl InteroperabilityReport {
    pub fn is_compatible_with(&self, standard: &str) -> bool {
        self.compatibility
            .iter()
            .any(|c| c.standard == standard && c.compatible)
    }
}

pub fn generate_interoperability_report(record: &StandardizedLoanData) -> InteroperabilityReport {
    let compatibility: Vec<StandardCompatibility> = REPORT_STANDARDS
        .iter()
        .map(|standard| {
            let missing = missing_for(standard, record);
            StandardCompatibility {
                standard: standard.to_string(),
                compatible: missing.is_empty(),
                missing_fields: missing.into_iter().map(String::from).collect(),
            }
        })
        .collect();

    let mut mapping_issues = Vec::new();
    let mut recommendations = Vec::new();

    let borrower = &record.parties.borrower;
    if borrower.entity_id.is_none() {
        mapping_issues.push("Borrower has no entity identifier (LEI)".to_string());
        recommendations.push("Add the borrower LEI as parties.borrower.entityId".to_string());
    }
    let lenders_without_id = record
        .parties
        .lenders
        .iter()
        .filter(|l| l.entity_id.is_none())
        .count();
    if lenders_without_id > 0 {
        mapping_issues.push(format!("{lenders_without_id} lender(s) lack an entity identifier"));
    }
    if record.regulatory.basel_risk_weight.is_none() {
        mapping_issues.push("Basel risk weight not stated".to_string());
        recommendations.push("Provide regulatory.baselRiskWeight for capital reporting".to_string());
    }
    if record.financial_terms.pricing.base_rate.is_none() {
        mapping_issues.push("Base rate not identified".to_string());
    }
    if record.financial_terms.term.maturity_date.is_none() {
        mapping_issues.push("Maturity date missing".to_string());
        recommendations.push("Record financialTerms.term.maturityDate".to_string());
    }
    if record.regulatory.governing_law.is_none() {
        recommendations.push("State the governing law for LMA/APLMA documentation".to_string());
    }
    if record
        .interoperability
        .supported_formats
        .iter()
        .any(|f| !f.is_lossless())
    {
        recommendations.push(format!(
            "Use {} for full-fidelity exchange; XML and CSV carry a six-field summary only",
            ExportFormat::Json
        ));
    }

    let compatible = compatibility.iter().filter(|c| c.compatible).count();
    let compatibility_score =
        (Decimal::from(compatible) * dec!(100) / Decimal::from(compatibility.len())).round_dp(2);

    debug!(
        loan_id = %record.id,
        compatible,
        issues = mapping_issues.len(),
        "interoperability report generated"
    );

    InteroperabilityReport {
        loan_id: record.id.clone(),
        data_standard: record.data_standard,
        compatibility,
        compatibility_score,
        mapping_issues,
        recommendations,
    }
}

fn missing_for(standard: &str, record: &StandardizedLoanData) -> Vec<&'static str> {
    let parties = &record.parties;
    let terms = &record.financial_terms;
    let mut missing = Vec::new();
    let mut need = |present: bool, field: &'static str| {
        if !present {
            missing.push(field);
        }
    };

    match standard {
        "LMA" => {
            need(!parties.lenders.is_empty(), "parties.lenders");
            need(record.facility.facility_type.is_some(), "facility.facilityType");
            need(record.regulatory.governing_law.is_some(), "regulatory.governingLaw");
        }
        "LSTA" => {
            need(!parties.lenders.is_empty(), "parties.lenders");
            need(record.facility.facility_type.is_some(), "facility.facilityType");
            need(terms.pricing.base_rate.is_some(), "financialTerms.pricing.baseRate");
            need(terms.pricing.margin.is_some(), "financialTerms.pricing.margin");
        }
        "APLMA" => {
            need(!parties.lenders.is_empty(), "parties.lenders");
            need(record.facility.facility_type.is_some(), "facility.facilityType");
            need(record.regulatory.jurisdiction.is_some(), "regulatory.jurisdiction");
        }
        "Basel III" => {
            need(
                record.regulatory.basel_risk_weight.is_some(),
                "regulatory.baselRiskWeight",
            );
        }
        "ISO 20022" => {
            need(
                is_currency_code(&terms.amount.currency),
                "financialTerms.amount.currency",
            );
            need(
                terms.pricing.effective_all_in_rate().is_some(),
                "financialTerms.pricing.allInRate",
            );
            need(terms.term.maturity_date.is_some(), "financialTerms.term.maturityDate");
        }
        "GLEIF LEI" => {
            need(parties.borrower.entity_id.is_some(), "parties.borrower.entityId");
            need(
                parties.lenders.iter().all(|l| l.entity_id.is_some()),
                "parties.lenders[].entityId",
            );
        }
        "SLLP" => match &record.esg {
            Some(esg) => {
                need(esg.sustainability_linked, "esg.sustainabilityLinked");
                need(!esg.kpis.is_empty(), "esg.kpis");
                need(esg.verification_required, "esg.verificationRequired");
            }
            None => need(false, "esg"),
        },
        _ => {}
    }
    missing
}
