use chrono::NaiveDate;
use loan_data_core::config::ConfidenceWeights;
use loan_data_core::extraction::contract::{CovenantCategory, ExtractedCovenant, ExtractedFee};
use loan_data_core::extraction::{
    parse_provider_response, score_confidence, DocumentIntelligenceAdapter, DocumentPayload,
    ExtractedLoanTerms, ExtractionMode, StaticProvider, MAX_AUTOMATED_CONFIDENCE,
};
use loan_data_core::schema::{FacilityType, FinancialCovenantType};
use loan_data_core::{standardize, ExtractionError, PartialLoanRecord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal_macros::dec;

const REGULATORY_RESPONSE: &str = r#"```json
{
  "loanAmount": "150m",
  "currency": "GBP",
  "interestRate": "6.15%",
  "margin": 225,
  "baseRate": "SONIA",
  "termMonths": "5 years",
  "maturityDate": "2030-03-31",
  "borrower": {"name": "Fabrikam Retail plc"},
  "lender": "Albion Bank",
  "facilityType": "Term Loan A",
  "purpose": "Acquisition financing",
  "covenants": [
    {"category": "financial", "type": "Net Leverage", "threshold": 3.75, "operator": "<=", "testingFrequency": "quarterly"},
    {"category": "operational", "type": "Negative pledge"}
  ],
  "fees": [
    {"type": "Arrangement fee", "percentage": "1.25%"}
  ],
  "regulatoryData": {
    "riskWeighting": 100,
    "capitalRequirement": "8%",
    "reportingRequirements": ["COREP"],
    "jurisdiction": "GB",
    "applicableRegulations": ["CRR"]
  }
}
```"#;

#[test]
fn test_regulatory_response_normalized() {
    let terms = parse_provider_response(REGULATORY_RESPONSE, ExtractionMode::Regulatory).unwrap();
    assert_eq!(terms.loan_amount, Some(dec!(150_000_000)));
    assert_eq!(terms.interest_rate, Some(dec!(0.0615)));
    assert_eq!(terms.term_months, Some(60));
    assert_eq!(terms.maturity_date, NaiveDate::from_ymd_opt(2030, 3, 31));
    assert_eq!(terms.borrower.as_deref(), Some("Fabrikam Retail plc"));
    assert_eq!(terms.fees[0].percentage, Some(dec!(0.0125)));
    let reg = terms.regulatory_data.unwrap();
    assert_eq!(reg.capital_requirement, Some(dec!(0.08)));
    assert_eq!(reg.jurisdiction.as_deref(), Some("GB"));
}

#[test]
fn test_amount_and_margin_forms_normalized() {
    let terms = parse_provider_response(
        r#"{"loanAmount": "2.5 million GBP", "margin": "2.75%"}"#,
        ExtractionMode::Institutional,
    )
    .unwrap();
    assert_eq!(terms.loan_amount, Some(dec!(2_500_000)));
    assert_eq!(terms.margin, Some(dec!(275)));

    let terms = parse_provider_response(
        r#"{"loanAmount": "250m USD", "margin": "275 bps"}"#,
        ExtractionMode::Institutional,
    )
    .unwrap();
    assert_eq!(terms.loan_amount, Some(dec!(250_000_000)));
    assert_eq!(terms.margin, Some(dec!(275)));

    let terms = parse_provider_response(r#"{"margin": 0.0275}"#, ExtractionMode::Institutional).unwrap();
    assert_eq!(terms.margin, Some(dec!(275)));
}

#[test]
fn test_unrecognised_amount_text_is_malformed() {
    let err = parse_provider_response(r#"{"loanAmount": "about 40 million or so"}"#, ExtractionMode::Institutional)
        .unwrap_err();
    assert!(matches!(err, ExtractionError::MalformedResponse(_)));
}

#[test]
fn test_covenant_without_threshold_kept_and_flagged() {
    let response = r#"{
        "loanAmount": 1000000, "currency": "USD", "borrower": "Tailspin Toys",
        "covenants": [{"category": "financial", "type": "Interest Cover"}]
    }"#;
    let terms = parse_provider_response(response, ExtractionMode::Institutional).unwrap();
    let out = standardize(&PartialLoanRecord::from_extraction(Some("ICR-1".into()), &terms));
    let record = out.record.unwrap();
    assert_eq!(record.covenants.financial.len(), 1);
    assert!(record.covenants.financial[0].threshold.is_none());
    assert!(record
        .data_quality
        .issues
        .iter()
        .any(|i| i.rule == "MissingCovenantThreshold"));
}

#[test]
fn test_comprehensive_requires_esg_and_market_blocks() {
    let err = parse_provider_response(REGULATORY_RESPONSE, ExtractionMode::Comprehensive).unwrap_err();
    assert!(matches!(err, ExtractionError::MissingModeBlock { .. }));
}

#[test]
fn test_plain_text_is_malformed() {
    let err = parse_provider_response("I could not read the document.", ExtractionMode::Institutional)
        .unwrap_err();
    assert!(matches!(err, ExtractionError::MalformedResponse(_)));
}

#[test]
fn test_extraction_feeds_standardizer() {
    let terms = parse_provider_response(REGULATORY_RESPONSE, ExtractionMode::Regulatory).unwrap();

    let anonymous = standardize(&PartialLoanRecord::from_extraction(None, &terms));
    assert_eq!(anonymous.error_messages(), vec!["Loan ID is required".to_string()]);

    let out = standardize(&PartialLoanRecord::from_extraction(Some("TLA-9".into()), &terms));
    assert!(out.errors.is_empty(), "{:?}", out.errors);
    let record = out.record.unwrap();
    assert_eq!(record.parties.lenders[0].name, "Albion Bank");
    assert_eq!(record.facility.facility_type, Some(FacilityType::TermLoan));
    assert_eq!(record.regulatory.basel_risk_weight, Some(dec!(100)));
    assert_eq!(record.fees[0].currency, "GBP");
    assert_eq!(record.covenants.financial.len(), 1);
    assert_eq!(record.covenants.operational.len(), 1);
    assert_eq!(
        record.covenants.financial[0].covenant_type,
        FinancialCovenantType::Leverage
    );
}

#[tokio::test]
async fn test_adapter_end_to_end() {
    let adapter = DocumentIntelligenceAdapter::new(StaticProvider::responding(REGULATORY_RESPONSE));
    let outcome = adapter
        .extract(
            DocumentPayload::Bytes {
                data: b"%PDF-1.7".to_vec(),
                mime_type: Some("application/pdf".into()),
            },
            "facility_agreement",
            ExtractionMode::Regulatory,
        )
        .await
        .unwrap();
    // everything present: capped
    assert_eq!(outcome.confidence, 99);
    assert_eq!(outcome.mode, ExtractionMode::Regulatory);
}

#[tokio::test]
async fn test_provider_unavailable_surfaces() {
    let adapter = DocumentIntelligenceAdapter::new(StaticProvider::failing(
        ExtractionError::ProviderUnavailable("connection refused".into()),
    ));
    let err = adapter
        .extract(DocumentPayload::Uri("s3://docs/a.pdf".into()), "term_sheet", ExtractionMode::Institutional)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::ProviderUnavailable(_)));
}

// ===========================================================================
// Confidence properties
// ===========================================================================

fn covenant(kind: &str) -> ExtractedCovenant {
    ExtractedCovenant {
        category: CovenantCategory::Financial,
        covenant_type: kind.into(),
        description: None,
        threshold: Some(dec!(3)),
        operator: None,
        unit: None,
        testing_frequency: None,
        next_test_date: None,
    }
}

fn arb_terms() -> impl Strategy<Value = ExtractedLoanTerms> {
    (
        any::<bool>(),
        any::<bool>(),
        prop::option::of("[A-Za-z ]{0,12}"),
        prop::option::of("[A-Za-z ]{0,12}"),
        prop::option::of(1u32..480),
        0usize..4,
        0usize..3,
        any::<bool>(),
    )
        .prop_map(|(amount, rate, borrower, lender, months, n_cov, n_fee, maturity)| {
            ExtractedLoanTerms {
                loan_amount: amount.then(|| dec!(1_000_000)),
                interest_rate: rate.then(|| dec!(0.05)),
                borrower,
                lender,
                term_months: months,
                maturity_date: if maturity { NaiveDate::from_ymd_opt(2031, 1, 1) } else { None },
                covenants: (0..n_cov).map(|i| covenant(&format!("cov{i}"))).collect(),
                fees: (0..n_fee)
                    .map(|i| ExtractedFee {
                        fee_type: format!("fee{i}"),
                        amount: Some(dec!(1000)),
                        percentage: None,
                        currency: None,
                        payment_timing: None,
                        description: None,
                    })
                    .collect(),
                ..Default::default()
            }
        })
}

proptest! {
    #[test]
    fn prop_confidence_bounded_and_deterministic(terms in arb_terms()) {
        let weights = ConfidenceWeights::default();
        let score = score_confidence(&terms, &weights);
        prop_assert!(score <= MAX_AUTOMATED_CONFIDENCE);
        prop_assert_eq!(score, score_confidence(&terms, &weights));
    }

    #[test]
    fn prop_confidence_order_independent(terms in arb_terms()) {
        let weights = ConfidenceWeights::default();
        let mut reversed = terms.clone();
        reversed.covenants.reverse();
        reversed.fees.reverse();
        prop_assert_eq!(score_confidence(&terms, &weights), score_confidence(&reversed, &weights));
    }
}
