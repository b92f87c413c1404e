//! Loan Data Standardizer
//!
//! Validates and normalizes a `PartialLoanRecord` into a
//! `StandardizedLoanData`. Rules run in a fixed order: required fields,
//! currency format, structural invariants, then business-logic warnings.
//! Every rule runs even after an error so callers see the complete list.

pub mod record;
pub mod rules;
pub mod validate;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ValidationConfig;
use crate::error::LoanDataError;
use crate::schema::loan::next_timestamp;
use crate::schema::{
    Borrower, DataQuality, Fee, FinancialTerms, Interoperability, IssueSeverity, Parties, Pricing,
    StandardizedLoanData, Term, ValidationIssue,
};
use crate::types::MonetaryAmount;
use crate::LoanDataResult;

pub use record::{PartialAmount, PartialBorrower, PartialFee, PartialLoanRecord};
pub use rules::is_currency_code;
pub use validate::{validate_loan_data, ValidationReport};

use rules::Findings;

const WARNING_PENALTY: Decimal = dec!(10);
const INFO_PENALTY: Decimal = dec!(2);

/// Result of one standardization pass.
///
/// `record` is `None` exactly when `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizationOutcome {
    pub record: Option<StandardizedLoanData>,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl StandardizationOutcome {
    pub fn is_accepted(&self) -> bool {
        self.record.is_some()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.message.clone()).collect()
    }

    /// The record, or the rejection as an error. A missing id always
    /// surfaces as `MissingIdentifier`.
    pub fn into_record(self) -> LoanDataResult<StandardizedLoanData> {
        match self.record {
            Some(record) => Ok(record),
            None if self.errors.iter().any(|e| e.rule == rules::MISSING_IDENTIFIER) => {
                Err(LoanDataError::MissingIdentifier)
            }
            None => Err(LoanDataError::ValidationFailed(self.errors)),
        }
    }
}

/// Standardize with default configuration, stamping the current time.
pub fn standardize(raw: &PartialLoanRecord) -> StandardizationOutcome {
    standardize_with(raw, &ValidationConfig::default(), Utc::now())
}

pub fn standardize_with(
    raw: &PartialLoanRecord,
    config: &ValidationConfig,
    now: DateTime<Utc>,
) -> StandardizationOutcome {
    let findings = run_rules(raw, config);

    let errors = findings.of_severity(IssueSeverity::Error);
    let warnings = findings.of_severity(IssueSeverity::Warning);

    debug!(
        loan_id = ?raw.id,
        rules = findings.rules_run.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "standardization rules evaluated"
    );

    let record = if errors.is_empty() {
        assemble(raw, config, now, findings)
    } else {
        None
    };

    StandardizationOutcome {
        record,
        errors,
        warnings,
    }
}

fn run_rules(raw: &PartialLoanRecord, config: &ValidationConfig) -> Findings {
    let mut f = Findings::default();

    f.run(rules::REQUIRED_FIELDS, |out| {
        if trimmed(&raw.id).is_none() {
            out.push(ValidationIssue::error(
                rules::MISSING_IDENTIFIER,
                "id",
                rules::MISSING_IDENTIFIER_MESSAGE,
            ));
        }
        if trimmed(&raw.borrower.name).is_none() {
            out.push(ValidationIssue::error(
                rules::MISSING_BORROWER_NAME,
                "parties.borrower.name",
                "Borrower name is required",
            ));
        }
        if raw.amount.value.is_none() {
            out.push(ValidationIssue::error(
                rules::MISSING_LOAN_AMOUNT,
                "financialTerms.amount.value",
                "Loan amount is required",
            ));
        }
        if trimmed(&raw.amount.currency).is_none() {
            out.push(ValidationIssue::error(
                rules::MISSING_CURRENCY,
                "financialTerms.amount.currency",
                "Currency is required",
            ));
        }
    });

    f.run(rules::CURRENCY_FORMAT, |out| {
        if let Some(code) = trimmed(&raw.amount.currency) {
            rules::currency(out, "financialTerms.amount.currency", code);
        }
        for (i, fee) in raw.fees.iter().enumerate() {
            if let Some(code) = trimmed(&fee.currency) {
                rules::currency(out, &format!("fees[{i}].currency"), code);
            }
        }
        rules::security_currencies(out, raw.security.as_ref());
    });

    f.run(rules::NON_NEGATIVE_AMOUNT, |out| {
        if let Some(value) = raw.amount.value {
            rules::non_negative_amount(out, value);
        }
    });
    f.run(rules::FEE_CHARGE, |out| {
        for (i, fee) in raw.fees.iter().enumerate() {
            rules::fee_charge(out, i, fee.charge());
        }
    });
    f.run(rules::FACILITY_CURRENCIES, |out| {
        rules::facility_currencies(out, &raw.facility, raw.amount.currency.as_deref())
    });
    f.run(rules::COVENANT_IDS, |out| rules::covenant_ids(out, &raw.covenants));
    f.run(rules::COVENANT_THRESHOLDS, |out| {
        rules::covenant_thresholds(out, &raw.covenants)
    });
    f.run(rules::ESG_PRICING_ADJUSTMENT, |out| {
        rules::esg_adjustments(out, raw.esg.as_ref())
    });
    f.run(rules::RISK_WEIGHT, |out| rules::risk_weight(out, &raw.regulatory));

    f.run(rules::JURISDICTION_CODE, |out| {
        rules::jurisdiction_code(out, &raw.regulatory)
    });
    f.run(rules::NEGATIVE_MARGIN, |out| rules::negative_margin(out, &raw.pricing));
    f.run(rules::TERM_CONSISTENCY, |out| {
        rules::term_consistency(out, &raw.term, config.term_tolerance_months)
    });
    f.run(rules::MATURITY_AFTER_ORIGINATION, |out| {
        rules::maturity_after_origination(out, &raw.term, &raw.documentation, &raw.lifecycle)
    });

    // A record without lenders is accepted here and flagged; validate_loan_data rejects it.
    f.run(rules::LENDER_PRESENT, |out| {
        if raw.lender.is_none() && raw.lenders.is_empty() {
            out.push(ValidationIssue::info(
                rules::MISSING_LENDER,
                "parties.lenders",
                "no lender of record",
            ));
        }
    });

    f
}

/// Build the canonical record. Only called once the required-field rules
/// have passed, so every `?` below succeeds.
fn assemble(
    raw: &PartialLoanRecord,
    config: &ValidationConfig,
    now: DateTime<Utc>,
    findings: Findings,
) -> Option<StandardizedLoanData> {
    let id = trimmed(&raw.id)?.to_string();
    let borrower_name = trimmed(&raw.borrower.name)?.to_string();
    let amount = raw.amount.value?;
    let currency = trimmed(&raw.amount.currency)?.to_string();

    let fees = raw
        .fees
        .iter()
        .map(|f| {
            Some(Fee {
                fee_type: f.fee_type,
                structure: f.structure.unwrap_or_else(|| f.fee_type.default_structure()),
                charge: f.charge()?,
                currency: trimmed(&f.currency).unwrap_or(&currency).to_string(),
                payment_timing: f.payment_timing.clone(),
                description: f.description.clone(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    let pricing = Pricing {
        all_in_rate: raw.pricing.effective_all_in_rate(),
        ..raw.pricing.clone()
    };
    let term = Term {
        years: raw.term.years.or_else(|| {
            raw.term
                .months
                .map(|m| (Decimal::from(m) / dec!(12)).round_dp(4))
        }),
        ..raw.term.clone()
    };

    let mut record = StandardizedLoanData {
        id,
        version: raw.version.map_or(1, |v| v + 1),
        last_updated: next_timestamp(raw.last_updated, now),
        data_standard: raw.data_standard.unwrap_or_default(),
        parties: Parties {
            borrower: Borrower {
                name: borrower_name,
                entity_id: raw.borrower.entity_id.clone(),
                jurisdiction: raw.borrower.jurisdiction.clone(),
                sector: raw.borrower.sector.clone(),
                credit_rating: raw.borrower.credit_rating.clone(),
            },
            lenders: raw.all_lenders(),
            agent: raw.agent.clone(),
            arrangers: raw.arrangers.clone(),
        },
        financial_terms: FinancialTerms {
            amount: MonetaryAmount::new(amount, currency),
            pricing,
            term,
        },
        facility: raw.facility.clone(),
        covenants: raw.covenants.clone(),
        security: raw.security.clone(),
        fees,
        esg: raw.esg.clone(),
        regulatory: raw.regulatory.clone(),
        documentation: raw.documentation.clone(),
        lifecycle: raw.lifecycle.clone(),
        data_quality: DataQuality {
            completeness: Decimal::ZERO,
            accuracy: Decimal::ZERO,
            last_validated: now,
            validation_rules: findings.rules_run,
            issues: Vec::new(),
        },
        interoperability: raw
            .interoperability
            .clone()
            .unwrap_or_else(|| Interoperability::for_source(&config.default_source_system)),
    };

    record.data_quality.completeness = completeness(&record);
    record.data_quality.accuracy = accuracy(&findings.issues);
    record.data_quality.issues = findings.issues;
    Some(record)
}

/// Share of optional fields populated, 0–100 to two decimal places.
pub fn completeness(record: &StandardizedLoanData) -> Decimal {
    let borrower = &record.parties.borrower;
    let pricing = &record.financial_terms.pricing;
    let term = &record.financial_terms.term;
    let regulatory = &record.regulatory;

    let checks = [
        borrower.entity_id.is_some(),
        borrower.jurisdiction.is_some(),
        borrower.sector.is_some(),
        borrower.credit_rating.is_some(),
        !record.parties.lenders.is_empty(),
        pricing.base_rate.is_some(),
        pricing.margin.is_some(),
        pricing.all_in_rate.is_some(),
        term.maturity_date.is_some(),
        term.months.is_some(),
        record.facility.facility_type.is_some(),
        record.facility.purpose.is_some(),
        !record.covenants.is_empty(),
        !record.fees.is_empty(),
        record.security.is_some(),
        record.esg.is_some(),
        regulatory.jurisdiction.is_some(),
        regulatory.governing_law.is_some(),
        regulatory.basel_risk_weight.is_some(),
    ];
    let populated = checks.iter().filter(|c| **c).count();
    (Decimal::from(populated) * dec!(100) / Decimal::from(checks.len())).round_dp(2)
}

/// 100 less 10 per outstanding warning and 2 per info finding, floored at 0.
pub fn accuracy(issues: &[ValidationIssue]) -> Decimal {
    let penalty: Decimal = issues
        .iter()
        .map(|i| match i.severity {
            IssueSeverity::Error => dec!(100),
            IssueSeverity::Warning => WARNING_PENALTY,
            IssueSeverity::Info => INFO_PENALTY,
        })
        .sum();
    (dec!(100) - penalty).max(Decimal::ZERO)
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FeeType, LifecycleState};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn minimal() -> PartialLoanRecord {
        PartialLoanRecord {
            id: Some("L1".into()),
            borrower: PartialBorrower {
                name: Some("  Acme Corp ".into()),
                ..Default::default()
            },
            amount: PartialAmount {
                value: Some(dec!(500000)),
                currency: Some("USD".into()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_record_accepted() {
        let out = standardize_with(&minimal(), &ValidationConfig::default(), now());
        let record = out.record.unwrap();
        assert_eq!(record.parties.borrower.name, "Acme Corp");
        assert_eq!(record.version, 1);
        assert_eq!(record.state(), LifecycleState::Draft);
        assert_eq!(record.data_quality.last_validated, now());
        assert_eq!(record.interoperability.source_system, "manual");
        // one info issue for the missing lender
        assert_eq!(record.data_quality.accuracy, dec!(98));
        assert_eq!(record.data_quality.completeness, dec!(0));
    }

    #[test]
    fn test_all_required_errors_collected() {
        let out = standardize(&PartialLoanRecord::default());
        let rules: Vec<_> = out.errors.iter().map(|e| e.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec![
                rules::MISSING_IDENTIFIER,
                rules::MISSING_BORROWER_NAME,
                rules::MISSING_LOAN_AMOUNT,
                rules::MISSING_CURRENCY
            ]
        );
        assert!(out.record.is_none());
        assert!(matches!(out.into_record(), Err(LoanDataError::MissingIdentifier)));
    }

    #[test]
    fn test_warnings_reported_alongside_errors() {
        let mut raw = minimal();
        raw.amount.currency = Some("usd".into());
        raw.pricing.margin = Some(dec!(-25));
        let out = standardize(&raw);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.warning_messages(), vec!["negative margin"]);
        assert!(matches!(out.into_record(), Err(LoanDataError::ValidationFailed(_))));
    }

    #[test]
    fn test_years_filled_from_months() {
        let mut raw = minimal();
        raw.term.months = Some(60);
        let record = standardize(&raw).record.unwrap();
        assert_eq!(record.financial_terms.term.years, Some(dec!(5)));
    }

    #[test]
    fn test_fee_currency_defaults_to_loan_currency() {
        let mut raw = minimal();
        raw.fees.push(PartialFee {
            fee_type: FeeType::Commitment,
            structure: None,
            amount: None,
            percentage: Some(dec!(0.0035)),
            currency: None,
            payment_timing: None,
            description: None,
        });
        let record = standardize(&raw).record.unwrap();
        assert_eq!(record.fees[0].currency, "USD");
        assert_eq!(record.fees[0].structure, crate::schema::FeeStructure::Ongoing);
    }

    #[test]
    fn test_all_in_rate_computed() {
        let mut raw = minimal();
        raw.pricing.base_rate_value = Some(dec!(0.04));
        raw.pricing.margin = Some(dec!(150));
        let record = standardize(&raw).record.unwrap();
        assert_eq!(record.financial_terms.pricing.all_in_rate, Some(dec!(0.055)));
    }

    #[test]
    fn test_accuracy_floor() {
        let issues: Vec<_> = (0..12)
            .map(|_| ValidationIssue::warning("W", "f", "w"))
            .collect();
        assert_eq!(accuracy(&issues), Decimal::ZERO);
    }
}
