//! Cross-loan comparison.
//!
//! Every per-loan output is a vector aligned with the input slice: index
//! `i` of each array describes `loans[i]`. `market_position`,
//! `risk_assessment` and `recommendations` are heuristic and advisory only.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

use crate::error::LoanDataError;
use crate::schema::{total_fee_amount, FinancialCovenantType, StandardizedLoanData};
use crate::types::{bps_to_rate, with_metadata, Bps, ComputationOutput, MonetaryAmount, Money, Rate};
use crate::LoanDataResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Distance from the peer mean all-in rate inside which pricing is "market".
const MARKET_BAND_BPS: Bps = dec!(25);
const HIGH_LEVERAGE: Decimal = dec!(5.0);
const ELEVATED_LEVERAGE: Decimal = dec!(4.0);
const THIN_COVERAGE: Decimal = dec!(1.5);

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    Tight,
    Market,
    Wide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparison {
    pub loan_ids: Vec<String>,
    pub all_in_rates: Vec<Option<Rate>>,
    pub margins: Vec<Option<Bps>>,
    /// Absolute fee amounts; percentage fees count as zero.
    pub total_fees: Vec<Money>,
    pub maturities: Vec<Option<NaiveDate>>,
    pub amounts: Vec<MonetaryAmount>,
    pub leverage_ratios: Vec<Option<Decimal>>,
    pub coverage_ratios: Vec<Option<Decimal>>,
    /// Financial plus operational covenants.
    pub covenant_counts: Vec<usize>,
    pub esg_linked: Vec<bool>,
    pub esg_scores: Vec<Option<Decimal>>,
    /// Advisory. `None` where the loan has no all-in rate.
    pub market_position: Vec<Option<MarketPosition>>,
    /// Advisory.
    pub risk_assessment: Vec<RiskLevel>,
    /// Advisory.
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare two or more canonical records. Missing optional data never
/// fails the comparison; it shows up as `None` in the affected array.
pub fn compare_loan_terms(
    loans: &[StandardizedLoanData],
) -> LoanDataResult<ComputationOutput<LoanComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if loans.len() < 2 {
        return Err(LoanDataError::InsufficientData(format!(
            "comparison needs at least two loans, got {}",
            loans.len()
        )));
    }

    let loan_ids: Vec<String> = loans.iter().map(|l| l.id.clone()).collect();
    let all_in_rates: Vec<Option<Rate>> = loans
        .iter()
        .map(|l| l.financial_terms.pricing.effective_all_in_rate())
        .collect();
    let margins = loans.iter().map(|l| l.financial_terms.pricing.margin).collect();
    let total_fees = loans.iter().map(|l| total_fee_amount(&l.fees, None)).collect();
    let maturities = loans
        .iter()
        .map(|l| l.financial_terms.term.maturity_date)
        .collect();
    let amounts: Vec<MonetaryAmount> = loans.iter().map(|l| l.financial_terms.amount.clone()).collect();
    let leverage_ratios: Vec<Option<Decimal>> = loans
        .iter()
        .map(|l| covenant_threshold(l, &[FinancialCovenantType::Leverage]))
        .collect();
    let coverage_ratios: Vec<Option<Decimal>> = loans
        .iter()
        .map(|l| {
            covenant_threshold(
                l,
                &[FinancialCovenantType::Coverage, FinancialCovenantType::DebtServiceCoverage],
            )
        })
        .collect();
    let covenant_counts = loans.iter().map(|l| l.covenants.testable_count()).collect();
    let esg_linked = loans
        .iter()
        .map(|l| l.esg.as_ref().is_some_and(|e| e.sustainability_linked))
        .collect();
    let esg_scores = loans
        .iter()
        .map(|l| l.esg.as_ref().and_then(|e| e.score))
        .collect();

    for (id, rate) in loan_ids.iter().zip(&all_in_rates) {
        if rate.is_none() {
            warnings.push(format!("Loan {id} has no all-in rate; excluded from pricing position"));
        }
    }
    let currencies: BTreeSet<&str> = amounts.iter().map(|a| a.currency.as_str()).collect();
    if currencies.len() > 1 {
        warnings.push(format!(
            "Loans are denominated in different currencies ({}); amounts and fees are not converted",
            currencies.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    let market_position = market_positions(&all_in_rates);
    let risk_assessment: Vec<RiskLevel> = loans
        .iter()
        .zip(leverage_ratios.iter().zip(&coverage_ratios))
        .map(|(loan, (lev, cov))| assess_risk(loan, *lev, *cov))
        .collect();
    let recommendations = recommend(loans, &all_in_rates, &risk_assessment);

    debug!(loans = loans.len(), warnings = warnings.len(), "loan comparison computed");

    let output = LoanComparison {
        loan_ids,
        all_in_rates,
        margins,
        total_fees,
        maturities,
        amounts,
        leverage_ratios,
        coverage_ratios,
        covenant_counts,
        esg_linked,
        esg_scores,
        market_position,
        risk_assessment,
        recommendations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan term comparison (index-aligned; positioning and risk are advisory)",
        &serde_json::json!({
            "loan_count": loans.len(),
            "market_band_bps": MARKET_BAND_BPS.to_string(),
            "fee_basis": "absolute amounts only",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn covenant_threshold(loan: &StandardizedLoanData, kinds: &[FinancialCovenantType]) -> Option<Decimal> {
    kinds
        .iter()
        .find_map(|k| loan.covenants.financial_of_type(*k))
        .and_then(|c| c.threshold.as_ref())
        .map(|t| t.value)
}

/// Position of each rate against the mean of the rates that are known.
fn market_positions(rates: &[Option<Rate>]) -> Vec<Option<MarketPosition>> {
    let known: Vec<Rate> = rates.iter().flatten().copied().collect();
    if known.is_empty() {
        return vec![None; rates.len()];
    }
    let mean = known.iter().copied().sum::<Decimal>() / Decimal::from(known.len());
    let band = bps_to_rate(MARKET_BAND_BPS);

    rates
        .iter()
        .map(|r| {
            r.map(|rate| {
                if rate < mean - band {
                    MarketPosition::Tight
                } else if rate > mean + band {
                    MarketPosition::Wide
                } else {
                    MarketPosition::Market
                }
            })
        })
        .collect()
}

fn assess_risk(loan: &StandardizedLoanData, leverage: Option<Decimal>, coverage: Option<Decimal>) -> RiskLevel {
    let mut points = 0u8;
    match leverage {
        Some(l) if l >= HIGH_LEVERAGE => points += 2,
        Some(l) if l >= ELEVATED_LEVERAGE => points += 1,
        _ => {}
    }
    if coverage.is_some_and(|c| c < THIN_COVERAGE) {
        points += 1;
    }
    if loan.covenants.financial.is_empty() {
        points += 1;
    }
    if !loan.security.as_ref().is_some_and(|s| s.secured) {
        points += 1;
    }
    match points {
        0 | 1 => RiskLevel::Low,
        2 => RiskLevel::Moderate,
        _ => RiskLevel::High,
    }
}

fn recommend(loans: &[StandardizedLoanData], rates: &[Option<Rate>], risk: &[RiskLevel]) -> Vec<String> {
    let mut out = Vec::new();

    if let Some((i, rate)) = rates
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.map(|r| (i, r)))
        .min_by_key(|(_, r)| *r)
    {
        out.push(format!(
            "Loan {} offers the lowest all-in rate ({}%)",
            loans[i].id,
            (rate * dec!(100)).round_dp(3)
        ));
    }
    for loan in loans.iter().filter(|l| l.covenants.financial.is_empty()) {
        out.push(format!(
            "Loan {} carries no financial covenants; review covenant-lite exposure",
            loan.id
        ));
    }
    for (loan, level) in loans.iter().zip(risk) {
        if *level == RiskLevel::High {
            out.push(format!("Loan {} screens as high risk; confirm leverage and security", loan.id));
        }
    }
    let linked: Vec<&str> = loans
        .iter()
        .filter(|l| l.esg.as_ref().is_some_and(|e| e.sustainability_linked))
        .map(|l| l.id.as_str())
        .collect();
    if !linked.is_empty() && linked.len() < loans.len() {
        out.push(format!(
            "Sustainability-linked pricing available on {}",
            linked.join(", ")
        ));
    }
    out
}
