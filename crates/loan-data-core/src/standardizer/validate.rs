use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{self, Findings};
use crate::config::ValidationConfig;
use crate::schema::{IssueSeverity, StandardizedLoanData, ValidationIssue};

/// Outcome of re-checking a canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub rules_run: Vec<String>,
}

/// Structural and business validation of an existing canonical record.
/// The record is not modified.
pub fn validate_loan_data(record: &StandardizedLoanData, config: &ValidationConfig) -> ValidationReport {
    let mut f = Findings::default();
    let terms = &record.financial_terms;

    f.run(rules::REQUIRED_FIELDS, |out| {
        if record.id.trim().is_empty() {
            out.push(ValidationIssue::error(
                rules::MISSING_IDENTIFIER,
                "id",
                rules::MISSING_IDENTIFIER_MESSAGE,
            ));
        }
        if record.parties.borrower.name.trim().is_empty() {
            out.push(ValidationIssue::error(
                rules::MISSING_BORROWER_NAME,
                "parties.borrower.name",
                "Borrower name is required",
            ));
        }
    });
    f.run(rules::LENDER_PRESENT, |out| {
        if record.parties.lenders.is_empty() {
            out.push(ValidationIssue::error(
                rules::MISSING_LENDER,
                "parties.lenders",
                "At least one lender is required",
            ));
        }
    });
    f.run(rules::CURRENCY_FORMAT, |out| {
        rules::currency(out, "financialTerms.amount.currency", &terms.amount.currency);
        for (i, fee) in record.fees.iter().enumerate() {
            rules::currency(out, &format!("fees[{i}].currency"), &fee.currency);
        }
        rules::security_currencies(out, record.security.as_ref());
    });
    f.run(rules::NON_NEGATIVE_AMOUNT, |out| {
        rules::non_negative_amount(out, terms.amount.value)
    });
    f.run(rules::FEE_CHARGE, |out| {
        for (i, fee) in record.fees.iter().enumerate() {
            rules::fee_charge(out, i, Some(fee.charge));
        }
    });
    f.run(rules::FACILITY_CURRENCIES, |out| {
        rules::facility_currencies(out, &record.facility, Some(&terms.amount.currency))
    });
    f.run(rules::COVENANT_IDS, |out| rules::covenant_ids(out, &record.covenants));
    f.run(rules::COVENANT_THRESHOLDS, |out| {
        rules::covenant_thresholds(out, &record.covenants)
    });
    f.run(rules::ESG_PRICING_ADJUSTMENT, |out| {
        rules::esg_adjustments(out, record.esg.as_ref())
    });
    f.run(rules::RISK_WEIGHT, |out| rules::risk_weight(out, &record.regulatory));
    f.run(rules::JURISDICTION_CODE, |out| {
        rules::jurisdiction_code(out, &record.regulatory)
    });
    f.run(rules::NEGATIVE_MARGIN, |out| rules::negative_margin(out, &terms.pricing));
    f.run(rules::TERM_CONSISTENCY, |out| {
        rules::term_consistency(out, &terms.term, config.term_tolerance_months)
    });
    f.run(rules::MATURITY_AFTER_ORIGINATION, |out| {
        rules::maturity_after_origination(out, &terms.term, &record.documentation, &record.lifecycle)
    });

    let errors = f.of_severity(IssueSeverity::Error);
    let warnings = f.of_severity(IssueSeverity::Warning);
    debug!(
        loan_id = %record.id,
        errors = errors.len(),
        warnings = warnings.len(),
        "loan data validated"
    );

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        rules_run: f.rules_run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EsgFramework, EsgKpi, EsgProvisions, Lender, PricingAdjustment, TestingFrequency};
    use crate::standardizer::{standardize, PartialAmount, PartialBorrower, PartialLoanRecord};
    use rust_decimal_macros::dec;

    fn record() -> StandardizedLoanData {
        let raw = PartialLoanRecord {
            id: Some("V-1".into()),
            borrower: PartialBorrower {
                name: Some("Acme".into()),
                ..Default::default()
            },
            lender: Some(Lender {
                name: "First Bank".into(),
                entity_id: None,
                lender_type: Default::default(),
            }),
            amount: PartialAmount {
                value: Some(dec!(1_000_000)),
                currency: Some("EUR".into()),
            },
            ..Default::default()
        };
        standardize(&raw).into_record().unwrap()
    }

    #[test]
    fn test_clean_record_is_valid() {
        let report = validate_loan_data(&record(), &ValidationConfig::default());
        assert!(report.valid);
        assert!(report.warnings.is_empty());
        assert!(report.rules_run.contains(&rules::COVENANT_IDS.to_string()));
    }

    #[test]
    fn test_missing_lender_is_an_error() {
        let mut r = record();
        r.parties.lenders.clear();
        let report = validate_loan_data(&r, &ValidationConfig::default());
        assert!(!report.valid);
        assert_eq!(report.errors[0].rule, rules::MISSING_LENDER);
    }

    #[test]
    fn test_esg_adjustment_signs() {
        let mut r = record();
        r.esg = Some(EsgProvisions {
            sustainability_linked: true,
            framework: EsgFramework::SustainabilityLinkedLoanPrinciples,
            kpis: vec![EsgKpi {
                metric: "Scope 1 emissions".into(),
                baseline: dec!(100),
                target: dec!(70),
                unit: "ktCO2e".into(),
                testing_frequency: TestingFrequency::Annually,
                pricing_adjustment: PricingAdjustment {
                    improvement_bps: dec!(5),
                    deterioration_bps: dec!(5),
                },
            }],
            use_of_proceeds: None,
            reporting_frequency: TestingFrequency::Annually,
            verification_required: true,
            score: None,
        });
        let report = validate_loan_data(&r, &ValidationConfig::default());
        assert_eq!(report.errors[0].rule, rules::INVALID_ESG_ADJUSTMENT);
    }

    #[test]
    fn test_risk_weight_bounds() {
        let mut r = record();
        r.regulatory.basel_risk_weight = Some(dec!(1500));
        r.regulatory.jurisdiction = Some("Germany".into());
        let report = validate_loan_data(&r, &ValidationConfig::default());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings[0].rule, rules::INVALID_JURISDICTION);
    }
}
