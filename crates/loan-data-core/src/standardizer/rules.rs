//! Validation rules shared by `standardize` and `validate_loan_data`.
//!
//! Each rule pushes zero or more issues; rule names are stable and appear
//! verbatim in `DataQuality::validation_rules`.

use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::schema::{
    is_alpha2_country, is_valid_risk_weight, Covenants, Documentation, EsgProvisions, FacilityDetails,
    FeeCharge, IssueSeverity, Lifecycle, Pricing, RegulatoryInfo, Security, Term, ValidationIssue,
};

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

// Rule groups, in evaluation order.
pub const REQUIRED_FIELDS: &str = "RequiredFields";
pub const CURRENCY_FORMAT: &str = "CurrencyFormat";
pub const NON_NEGATIVE_AMOUNT: &str = "NonNegativeAmount";
pub const FEE_CHARGE: &str = "FeeCharge";
pub const FACILITY_CURRENCIES: &str = "FacilityCurrencies";
pub const COVENANT_IDS: &str = "CovenantIds";
pub const COVENANT_THRESHOLDS: &str = "CovenantThresholds";
pub const ESG_PRICING_ADJUSTMENT: &str = "EsgPricingAdjustment";
pub const RISK_WEIGHT: &str = "RiskWeight";
pub const JURISDICTION_CODE: &str = "JurisdictionCode";
pub const NEGATIVE_MARGIN: &str = "NegativeMargin";
pub const TERM_CONSISTENCY: &str = "TermConsistency";
pub const MATURITY_AFTER_ORIGINATION: &str = "MaturityAfterOrigination";
pub const LENDER_PRESENT: &str = "LenderPresent";

// Issue rule names.
pub const MISSING_IDENTIFIER: &str = "MissingIdentifier";
pub const MISSING_BORROWER_NAME: &str = "MissingBorrowerName";
pub const MISSING_LOAN_AMOUNT: &str = "MissingLoanAmount";
pub const MISSING_CURRENCY: &str = "MissingCurrency";
pub const MISSING_LENDER: &str = "MissingLender";
pub const INVALID_CURRENCY_FORMAT: &str = "InvalidCurrencyFormat";
pub const NEGATIVE_LOAN_AMOUNT: &str = "NegativeLoanAmount";
pub const AMBIGUOUS_FEE_CHARGE: &str = "AmbiguousFeeCharge";
pub const NEGATIVE_FEE: &str = "NegativeFee";
pub const MULTICURRENCY_MISMATCH: &str = "MulticurrencyMismatch";
pub const MISSING_COVENANT_ID: &str = "MissingCovenantId";
pub const DUPLICATE_COVENANT_ID: &str = "DuplicateCovenantId";
pub const MISSING_COVENANT_THRESHOLD: &str = "MissingCovenantThreshold";
pub const INVALID_ESG_ADJUSTMENT: &str = "InvalidEsgPricingAdjustment";
pub const INVALID_RISK_WEIGHT: &str = "InvalidRiskWeight";
pub const INVALID_JURISDICTION: &str = "InvalidJurisdictionCode";
pub const TERM_INCONSISTENCY: &str = "TermInconsistency";
pub const MATURITY_BEFORE_ORIGINATION: &str = "MaturityBeforeOrigination";

pub const MISSING_IDENTIFIER_MESSAGE: &str = "Loan ID is required";
pub const NEGATIVE_MARGIN_MESSAGE: &str = "negative margin";

/// ISO-4217 alphabetic shape: three upper-case ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    CURRENCY_RE.is_match(code)
}

/// Issues collected across a rule pass, plus the names of the rules run.
#[derive(Debug, Default)]
pub struct Findings {
    pub issues: Vec<ValidationIssue>,
    pub rules_run: Vec<String>,
}

impl Findings {
    pub fn run(&mut self, rule: &str, check: impl FnOnce(&mut Vec<ValidationIssue>)) {
        self.rules_run.push(rule.to_string());
        check(&mut self.issues);
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == IssueSeverity::Error)
    }

    pub fn of_severity(&self, severity: IssueSeverity) -> Vec<ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Structural rules (errors)
// ---------------------------------------------------------------------------

pub fn currency(out: &mut Vec<ValidationIssue>, field: &str, code: &str) {
    if !is_currency_code(code) {
        out.push(ValidationIssue::error(
            INVALID_CURRENCY_FORMAT,
            field,
            format!("currency '{code}' must be a three-letter upper-case ISO-4217 code"),
        ));
    }
}

pub fn non_negative_amount(out: &mut Vec<ValidationIssue>, value: Decimal) {
    if value.is_sign_negative() && !value.is_zero() {
        out.push(ValidationIssue::error(
            NEGATIVE_LOAN_AMOUNT,
            "financialTerms.amount.value",
            format!("loan amount must not be negative (got {value})"),
        ));
    }
}

pub fn fee_charge(out: &mut Vec<ValidationIssue>, index: usize, charge: Option<FeeCharge>) {
    let field = format!("fees[{index}]");
    match charge {
        None => out.push(ValidationIssue::error(
            AMBIGUOUS_FEE_CHARGE,
            &field,
            "fee must carry exactly one of amount or percentage",
        )),
        Some(c) => {
            let value = c.amount().or(c.percentage()).unwrap_or(Decimal::ZERO);
            if value < Decimal::ZERO {
                out.push(ValidationIssue::error(
                    NEGATIVE_FEE,
                    &field,
                    format!("fee charge must not be negative (got {value})"),
                ));
            }
        }
    }
}

/// `loan_currency` is the facility's base currency; a multicurrency
/// option list that names currencies must include it.
pub fn facility_currencies(
    out: &mut Vec<ValidationIssue>,
    facility: &FacilityDetails,
    loan_currency: Option<&str>,
) {
    if !facility.multicurrency && !facility.currencies.is_empty() {
        out.push(ValidationIssue::error(
            MULTICURRENCY_MISMATCH,
            "facility.currencies",
            "currency list must be empty unless the facility is multicurrency",
        ));
    }
    if let Some(base) = loan_currency.map(str::trim).filter(|c| !c.is_empty()) {
        if facility.multicurrency
            && !facility.currencies.is_empty()
            && !facility.currencies.iter().any(|c| c.trim() == base)
        {
            out.push(ValidationIssue::error(
                MULTICURRENCY_MISMATCH,
                "facility.currencies",
                format!("multicurrency list does not include the loan currency {base}"),
            ));
        }
    }
    for (i, code) in facility.currencies.iter().enumerate() {
        currency(out, &format!("facility.currencies[{i}]"), code);
    }
    if let Some(commitment) = &facility.commitment {
        currency(out, "facility.commitment.currency", &commitment.currency);
    }
}

pub fn security_currencies(out: &mut Vec<ValidationIssue>, security: Option<&Security>) {
    let Some(security) = security else { return };
    for (i, c) in security.collateral.iter().enumerate() {
        if let Some(v) = &c.value {
            currency(out, &format!("security.collateral[{i}].value.currency"), &v.currency);
        }
    }
    for (i, g) in security.guarantees.iter().enumerate() {
        if let Some(a) = &g.amount {
            currency(out, &format!("security.guarantees[{i}].amount.currency"), &a.currency);
        }
    }
}

/// Covenant ids are unique across the financial, operational and reporting lists.
/// Financial covenants without a stated level are kept but flagged.
pub fn covenant_thresholds(out: &mut Vec<ValidationIssue>, covenants: &Covenants) {
    for (i, c) in covenants.financial.iter().enumerate() {
        if c.threshold.is_none() {
            out.push(ValidationIssue::info(
                MISSING_COVENANT_THRESHOLD,
                &format!("covenants.financial[{i}].threshold"),
                format!("covenant '{}' has no threshold", c.id),
            ));
        }
    }
}

pub fn covenant_ids(out: &mut Vec<ValidationIssue>, covenants: &Covenants) {
    let mut seen = HashSet::new();
    for id in covenants.ids() {
        if id.trim().is_empty() {
            out.push(ValidationIssue::error(
                MISSING_COVENANT_ID,
                "covenants",
                "every covenant needs a non-empty id",
            ));
        } else if !seen.insert(id) {
            out.push(ValidationIssue::error(
                DUPLICATE_COVENANT_ID,
                "covenants",
                format!("covenant id '{id}' is used more than once"),
            ));
        }
    }
}

pub fn esg_adjustments(out: &mut Vec<ValidationIssue>, esg: Option<&EsgProvisions>) {
    let Some(esg) = esg else { return };
    for (i, kpi) in esg.kpis.iter().enumerate() {
        if !kpi.pricing_adjustment.is_well_signed() {
            out.push(ValidationIssue::error(
                INVALID_ESG_ADJUSTMENT,
                &format!("esg.kpis[{i}].pricingAdjustment"),
                "improvement must be <= 0 bps and deterioration >= 0 bps",
            ));
        }
    }
}

pub fn risk_weight(out: &mut Vec<ValidationIssue>, regulatory: &RegulatoryInfo) {
    if let Some(weight) = regulatory.basel_risk_weight {
        if !is_valid_risk_weight(weight) {
            out.push(ValidationIssue::error(
                INVALID_RISK_WEIGHT,
                "regulatory.baselRiskWeight",
                format!("Basel risk weight {weight} outside 0-1250"),
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Business rules (warnings)
// ---------------------------------------------------------------------------

/// Jurisdiction shape is flagged, never enforced.
pub fn jurisdiction_code(out: &mut Vec<ValidationIssue>, regulatory: &RegulatoryInfo) {
    if let Some(code) = regulatory.jurisdiction.as_deref() {
        if !is_alpha2_country(code) {
            out.push(ValidationIssue::warning(
                INVALID_JURISDICTION,
                "regulatory.jurisdiction",
                format!("jurisdiction '{code}' is not an ISO-3166-1 alpha-2 code"),
            ));
        }
    }
}

pub fn negative_margin(out: &mut Vec<ValidationIssue>, pricing: &Pricing) {
    if pricing.margin.is_some_and(|m| m < Decimal::ZERO) {
        out.push(ValidationIssue::warning(
            NEGATIVE_MARGIN,
            "financialTerms.pricing.margin",
            NEGATIVE_MARGIN_MESSAGE,
        ));
    }
}

pub fn term_consistency(out: &mut Vec<ValidationIssue>, term: &Term, tolerance_months: u32) {
    if let (Some(months), Some(years)) = (term.months, term.years) {
        let gap = (Decimal::from(months) - years * Decimal::from(12)).abs();
        if gap > Decimal::from(tolerance_months) {
            out.push(ValidationIssue::warning(
                TERM_INCONSISTENCY,
                "financialTerms.term",
                format!("term of {months} months does not match {years} years"),
            ));
        }
    }
}

pub fn maturity_after_origination(
    out: &mut Vec<ValidationIssue>,
    term: &Term,
    documentation: &Documentation,
    lifecycle: &Lifecycle,
) {
    let Some(maturity) = term.maturity_date else { return };
    let latest_origination = term
        .origination_date
        .into_iter()
        .chain(documentation.credit_agreement.execution_date)
        .chain(lifecycle.origination_dates())
        .max();
    if let Some(origin) = latest_origination {
        if maturity <= origin {
            out.push(ValidationIssue::warning(
                MATURITY_BEFORE_ORIGINATION,
                "financialTerms.term.maturityDate",
                format!("maturity {maturity} is not after origination {origin}"),
            ));
        }
    }
}
