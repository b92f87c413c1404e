use loan_data_core::comparison::{compare_loan_terms, MarketPosition, RiskLevel};
use loan_data_core::schema::{
    ComparisonOperator, EsgFramework, EsgProvisions, FeeType, FinancialCovenant,
    FinancialCovenantStatus, FinancialCovenantType, Security, TestingFrequency, Threshold,
};
use loan_data_core::standardizer::{PartialAmount, PartialBorrower, PartialFee, PartialLoanRecord};
use loan_data_core::{standardize, LoanDataError, StandardizedLoanData};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn loan(id: &str, all_in: Option<Decimal>, currency: &str) -> PartialLoanRecord {
    let mut raw = PartialLoanRecord {
        id: Some(id.into()),
        borrower: PartialBorrower {
            name: Some(format!("Borrower {id}")),
            ..Default::default()
        },
        amount: PartialAmount {
            value: Some(dec!(10_000_000)),
            currency: Some(currency.into()),
        },
        ..Default::default()
    };
    raw.pricing.all_in_rate = all_in;
    raw
}

fn covenant(id: &str, kind: FinancialCovenantType, value: Decimal) -> FinancialCovenant {
    FinancialCovenant {
        id: id.into(),
        covenant_type: kind,
        description: None,
        threshold: Some(Threshold {
            value,
            operator: ComparisonOperator::AtMost,
            unit: "x".into(),
        }),
        testing_frequency: TestingFrequency::Quarterly,
        testing_dates: vec![],
        status: FinancialCovenantStatus::Compliant,
        last_test_date: None,
        next_test_date: None,
    }
}

fn record(raw: PartialLoanRecord) -> StandardizedLoanData {
    standardize(&raw).into_record().unwrap()
}

fn three_loans() -> Vec<StandardizedLoanData> {
    let mut a = loan("A", Some(dec!(0.060)), "USD");
    a.pricing.margin = Some(dec!(250));
    a.covenants.financial.push(covenant("a-lev", FinancialCovenantType::Leverage, dec!(3.5)));
    a.covenants.financial.push(covenant("a-icr", FinancialCovenantType::Coverage, dec!(3.0)));
    a.security = Some(Security {
        secured: true,
        ..Default::default()
    });
    a.fees.push(PartialFee {
        fee_type: FeeType::Arrangement,
        structure: None,
        amount: Some(dec!(150_000)),
        percentage: None,
        currency: None,
        payment_timing: None,
        description: None,
    });
    a.fees.push(PartialFee {
        fee_type: FeeType::Commitment,
        structure: None,
        amount: None,
        percentage: Some(dec!(0.0035)),
        currency: None,
        payment_timing: None,
        description: None,
    });

    let mut b = loan("B", Some(dec!(0.070)), "USD");
    b.covenants.financial.push(covenant("b-lev", FinancialCovenantType::Leverage, dec!(6.0)));
    b.esg = Some(EsgProvisions {
        sustainability_linked: true,
        framework: EsgFramework::SustainabilityLinkedLoanPrinciples,
        kpis: vec![],
        use_of_proceeds: None,
        reporting_frequency: TestingFrequency::Annually,
        verification_required: true,
        score: Some(dec!(72)),
    });

    let c = loan("C", None, "USD");

    vec![record(a), record(b), record(c)]
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn test_arrays_index_aligned() {
    let loans = three_loans();
    let out = compare_loan_terms(&loans).unwrap();
    let cmp = &out.result;

    assert_eq!(cmp.loan_ids, vec!["A", "B", "C"]);
    assert_eq!(cmp.all_in_rates, vec![Some(dec!(0.060)), Some(dec!(0.070)), None]);
    assert_eq!(cmp.margins, vec![Some(dec!(250)), None, None]);
    assert_eq!(cmp.total_fees, vec![dec!(150_000), Decimal::ZERO, Decimal::ZERO]);
    assert_eq!(cmp.leverage_ratios, vec![Some(dec!(3.5)), Some(dec!(6.0)), None]);
    assert_eq!(cmp.coverage_ratios, vec![Some(dec!(3.0)), None, None]);
    assert_eq!(cmp.covenant_counts, vec![2, 1, 0]);
    assert_eq!(cmp.esg_linked, vec![false, true, false]);
    assert_eq!(cmp.esg_scores, vec![None, Some(dec!(72)), None]);
}

#[test]
fn test_advisory_outputs() {
    let out = compare_loan_terms(&three_loans()).unwrap();
    let cmp = &out.result;

    assert_eq!(
        cmp.market_position,
        vec![Some(MarketPosition::Tight), Some(MarketPosition::Wide), None]
    );
    // A: secured, moderate leverage; B: 6x unsecured; C: covenant-lite unsecured
    assert_eq!(
        cmp.risk_assessment,
        vec![RiskLevel::Low, RiskLevel::High, RiskLevel::Moderate]
    );
    assert!(cmp.recommendations[0].starts_with("Loan A offers the lowest all-in rate"));
    assert!(cmp.recommendations.iter().any(|r| r.contains("Loan C carries no financial covenants")));
    assert!(out.warnings.iter().any(|w| w.contains("Loan C has no all-in rate")));
}

#[test]
fn test_mixed_currencies_warned() {
    let loans = vec![
        record(loan("X", Some(dec!(0.05)), "USD")),
        record(loan("Y", Some(dec!(0.05)), "EUR")),
    ];
    let out = compare_loan_terms(&loans).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("EUR, USD")));
}

#[test]
fn test_single_loan_rejected() {
    let loans = vec![record(loan("solo", None, "USD"))];
    let err = compare_loan_terms(&loans).unwrap_err();
    assert!(matches!(err, LoanDataError::InsufficientData(_)));
}

proptest! {
    #[test]
    fn prop_comparison_arrays_match_input_length(
        rates in prop::collection::vec(prop::option::of(0u32..2000u32), 2..12)
    ) {
        let loans: Vec<StandardizedLoanData> = rates
            .iter()
            .enumerate()
            .map(|(i, r)| record(loan(&format!("P{i}"), r.map(|bps| Decimal::from(bps) / dec!(10000)), "USD")))
            .collect();
        let cmp = compare_loan_terms(&loans).unwrap().result;
        let n = loans.len();

        prop_assert_eq!(cmp.loan_ids.len(), n);
        prop_assert_eq!(cmp.all_in_rates.len(), n);
        prop_assert_eq!(cmp.margins.len(), n);
        prop_assert_eq!(cmp.total_fees.len(), n);
        prop_assert_eq!(cmp.maturities.len(), n);
        prop_assert_eq!(cmp.amounts.len(), n);
        prop_assert_eq!(cmp.leverage_ratios.len(), n);
        prop_assert_eq!(cmp.coverage_ratios.len(), n);
        prop_assert_eq!(cmp.covenant_counts.len(), n);
        prop_assert_eq!(cmp.esg_linked.len(), n);
        prop_assert_eq!(cmp.esg_scores.len(), n);
        prop_assert_eq!(cmp.market_position.len(), n);
        prop_assert_eq!(cmp.risk_assessment.len(), n);
        for (i, id) in cmp.loan_ids.iter().enumerate() {
            prop_assert_eq!(id, &loans[i].id);
        }
    }
}
