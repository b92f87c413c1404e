use chrono::{Duration, NaiveDate};
use loan_data_core::config::{ExportConfig, ValidationConfig};
use loan_data_core::interop::{export_to_format, import_json};
use loan_data_core::schema::{
    Amendment, AmendmentType, BaseRate, ExportFormat, FeeType, FinancialCovenant,
    FinancialCovenantStatus, FinancialCovenantType, IssueSeverity, Lender, LenderType,
    LifecycleState, Threshold, ComparisonOperator, TestingFrequency,
};
use loan_data_core::standardizer::{PartialFee, PartialLoanRecord};
use loan_data_core::{
    standardize, standardize_with, validate_loan_data, LoanDataError, StandardizedLoanData,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;

// ===========================================================================
// Helpers
// ===========================================================================

fn parse(value: serde_json::Value) -> PartialLoanRecord {
    serde_json::from_value(value).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A syndicated term loan with one warning (term mismatch) baked in.
fn rich_record() -> PartialLoanRecord {
    let mut raw = parse(json!({
        "id": "TLB-2025-001",
        "dataStandard": "LSTA",
        "borrower": {
            "name": "Northwind Logistics Inc",
            "entityId": "5493001KJTIIGC8Y1R12",
            "jurisdiction": "US",
            "sector": "Transportation",
            "creditRating": "B+"
        },
        "lenders": [
            {"name": "First Capital Bank", "type": "bank"},
            {"name": "Harbor Credit Fund", "type": "institutional"}
        ],
        "amount": {"value": 350000000, "currency": "USD"},
        "pricing": {"baseRate": "SOFR", "baseRateValue": "0.0530", "margin": 375, "dayCount": "ACT/360"},
        "term": {"months": 84, "years": 6, "maturityDate": "2032-04-30", "originationDate": "2025-04-30"},
        "facility": {"facilityType": "term_loan", "purpose": "Refinancing"},
        "regulatory": {"jurisdiction": "US", "governingLaw": "New York", "baselRiskWeight": "100"}
    }));
    raw.fees.push(PartialFee {
        fee_type: FeeType::Arrangement,
        structure: None,
        amount: None,
        percentage: Some(dec!(0.015)),
        currency: None,
        payment_timing: Some("at closing".into()),
        description: None,
    });
    raw.covenants.financial.push(FinancialCovenant {
        id: "lev-1".into(),
        covenant_type: FinancialCovenantType::Leverage,
        description: Some("Total net leverage".into()),
        threshold: Some(Threshold {
            value: dec!(5.25),
            operator: ComparisonOperator::AtMost,
            unit: "x".into(),
        }),
        testing_frequency: TestingFrequency::Quarterly,
        testing_dates: vec![],
        status: FinancialCovenantStatus::Compliant,
        last_test_date: None,
        next_test_date: Some(date(2025, 9, 30)),
    });
    raw
}

fn accepted(raw: &PartialLoanRecord) -> StandardizedLoanData {
    standardize(raw).into_record().unwrap()
}

// ===========================================================================
// Acceptance / rejection
// ===========================================================================

#[test]
fn test_negative_margin_single_warning() {
    let raw = parse(json!({
        "id": "L1",
        "borrower": {"name": "Acme"},
        "amount": {"value": 500000, "currency": "USD"},
        "pricing": {"margin": -50}
    }));
    let out = standardize(&raw);
    assert!(out.errors.is_empty());
    assert_eq!(out.warning_messages(), vec!["negative margin".to_string()]);
    let record = out.record.unwrap();
    assert_eq!(record.id, "L1");
    assert_eq!(record.financial_terms.pricing.margin, Some(dec!(-50)));
    assert_eq!(record.data_quality.warnings().count(), 1);
}

#[test]
fn test_missing_id_is_never_invented() {
    let raw = parse(json!({
        "borrower": {"name": "Acme"},
        "amount": {"value": 500000, "currency": "USD"},
        "pricing": {"margin": -50}
    }));
    let out = standardize(&raw);
    assert_eq!(out.error_messages(), vec!["Loan ID is required".to_string()]);
    assert!(out.record.is_none());
    assert!(matches!(out.into_record(), Err(LoanDataError::MissingIdentifier)));
}

#[test]
fn test_lowercase_currency_rejected() {
    let raw = parse(json!({
        "id": "L2",
        "borrower": {"name": "Acme"},
        "amount": {"value": 500000, "currency": "usd"}
    }));
    let out = standardize(&raw);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].rule, "InvalidCurrencyFormat");
    assert_eq!(out.errors[0].field, "financialTerms.amount.currency");
    assert!(out.record.is_none());
}

#[test]
fn test_rich_record_normalized() {
    let record = accepted(&rich_record());
    assert_eq!(record.parties.lenders[0].lender_type, LenderType::Bank);
    assert_eq!(record.financial_terms.pricing.base_rate, Some(BaseRate::Sofr));
    assert_eq!(record.financial_terms.pricing.all_in_rate, Some(dec!(0.0905)));
    assert_eq!(record.fees[0].currency, "USD");

    let warnings: Vec<_> = record.data_quality.warnings().map(|w| w.rule.as_str()).collect();
    assert_eq!(warnings, vec!["TermInconsistency"]);
    assert_eq!(record.data_quality.accuracy, dec!(90));
    // 17 of 19 optional fields: no security, no ESG
    assert_eq!(record.data_quality.completeness, dec!(89.47));
}

#[test]
fn test_maturity_before_origination_warns() {
    let mut raw = rich_record();
    raw.term.years = Some(dec!(7));
    raw.term.maturity_date = Some(date(2024, 1, 1));
    let out = standardize(&raw);
    assert!(out.errors.is_empty());
    assert_eq!(out.warnings[0].rule, "MaturityBeforeOrigination");
}

#[test]
fn test_fee_with_both_amount_and_percentage_rejected() {
    let mut raw = rich_record();
    raw.fees[0].amount = Some(dec!(100_000));
    let out = standardize(&raw);
    assert_eq!(out.errors[0].rule, "AmbiguousFeeCharge");
    assert!(matches!(out.into_record(), Err(LoanDataError::ValidationFailed(e)) if e.len() == 1));
}

// ===========================================================================
// Idempotence through JSON
// ===========================================================================

#[test]
fn test_standardize_idempotent_through_json() {
    let first = accepted(&rich_record());
    let json = export_to_format(&first, ExportFormat::Json, &ExportConfig::default()).unwrap();
    let imported = import_json(&json).unwrap();
    assert_eq!(imported, first);

    let second = standardize(&PartialLoanRecord::from(&imported));
    let second_record = second.record.clone().unwrap();

    assert!(second.errors.is_empty());
    assert_eq!(second_record.data_quality.issues, first.data_quality.issues);
    assert_eq!(second_record.data_quality.completeness, first.data_quality.completeness);
    assert_eq!(second_record.data_quality.accuracy, first.data_quality.accuracy);
    assert_eq!(second_record.fees, first.fees);
    assert_eq!(second_record.financial_terms, first.financial_terms);
    assert_eq!(second_record.version, first.version + 1);
}

#[test]
fn test_validate_canonical_record() {
    let record = accepted(&rich_record());
    let report = validate_loan_data(&record, &ValidationConfig::default());
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.errors.iter().all(|e| e.severity == IssueSeverity::Error));

    let lenient = ValidationConfig {
        term_tolerance_months: 12,
        ..Default::default()
    };
    assert!(validate_loan_data(&record, &lenient).warnings.is_empty());
}

// ===========================================================================
// Lifecycle
// ===========================================================================

#[test]
fn test_draft_cannot_jump_to_active() {
    let mut record = accepted(&rich_record());
    let err = record
        .transition(LifecycleState::Active, date(2025, 5, 1), None)
        .unwrap_err();
    assert!(matches!(
        err,
        LoanDataError::InvalidTransition {
            from: LifecycleState::Draft,
            to: LifecycleState::Active
        }
    ));
    assert!(record.lifecycle.milestones.is_empty());
}

#[test]
fn test_full_path_to_default() {
    let mut record = accepted(&rich_record());
    let start_version = record.version;
    let mut last = record.last_updated;

    for (i, state) in [
        LifecycleState::Negotiation,
        LifecycleState::Documentation,
        LifecycleState::Executed,
        LifecycleState::Active,
        LifecycleState::Defaulted,
    ]
    .into_iter()
    .enumerate()
    {
        let milestone = record
            .transition(state, date(2025, 5, 1 + i as u32), None)
            .unwrap();
        assert_eq!(milestone.event, state.as_str());
        assert!(record.last_updated > last);
        last = record.last_updated;
    }

    assert_eq!(record.state(), LifecycleState::Defaulted);
    assert_eq!(record.version, start_version + 5);
    assert_eq!(record.lifecycle.milestones.len(), 5);

    let err = record
        .transition(LifecycleState::Active, date(2025, 6, 1), None)
        .unwrap_err();
    assert!(matches!(err, LoanDataError::TerminalState(LifecycleState::Defaulted)));
}

#[test]
fn test_amendments_append_only() {
    let mut record = accepted(&rich_record());
    let margin_before = record.financial_terms.pricing.margin;
    let amendment = Amendment {
        id: "A-1".into(),
        date: date(2026, 1, 15),
        amendment_type: AmendmentType::Pricing,
        description: "Margin step-down to 350 bps".into(),
        executed: true,
    };
    record.amend(amendment.clone()).unwrap();
    assert_eq!(record.lifecycle.amendments, vec![amendment.clone()]);
    assert_eq!(record.financial_terms.pricing.margin, margin_before);

    let dup = record.amend(amendment).unwrap_err();
    assert!(matches!(dup, LoanDataError::InvalidInput { .. }));
    assert_eq!(record.lifecycle.amendments.len(), 1);
}

#[test]
fn test_missing_lender_flagged_as_info() {
    let mut raw = rich_record();
    raw.lenders.clear();
    let record = accepted(&raw);
    assert!(record
        .data_quality
        .issues
        .iter()
        .any(|i| i.rule == "MissingLender" && i.severity == IssueSeverity::Info));

    let report = validate_loan_data(&record, &ValidationConfig::default());
    assert!(!report.valid);
}

#[test]
fn test_lender_of_record_alias() {
    let mut raw = rich_record();
    raw.lender = Some(Lender {
        name: "Agent Bank".into(),
        entity_id: None,
        lender_type: LenderType::Syndicate,
    });
    let record = accepted(&raw);
    assert_eq!(record.parties.lead_lender().unwrap().name, "Agent Bank");
    assert_eq!(record.parties.lenders.len(), 3);
}

#[test]
fn test_restandardize_never_moves_last_updated_back() {
    let mut record = accepted(&rich_record());
    record
        .transition(LifecycleState::Negotiation, date(2025, 5, 1), None)
        .unwrap();

    let earlier = record.last_updated - Duration::hours(1);
    let again = standardize_with(&PartialLoanRecord::from(&record), &ValidationConfig::default(), earlier)
        .into_record()
        .unwrap();
    assert_eq!(again.version, record.version + 1);
    assert!(again.last_updated > record.last_updated);
}

#[test]
fn test_multicurrency_list_without_loan_currency_rejected() {
    let mut raw = rich_record();
    raw.facility.multicurrency = true;
    raw.facility.currencies = vec!["EUR".into(), "GBP".into()];
    let out = standardize(&raw);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].rule, "MulticurrencyMismatch");

    raw.facility.currencies.push("USD".into());
    assert!(standardize(&raw).errors.is_empty());
}
