use serde::{Deserialize, Serialize};

use super::contract::ExtractedLoanTerms;
use crate::config::{ConfidenceWeights, HUMAN_VERIFIED_CONFIDENCE};

/// Highest score automated scoring can ever return.
pub const MAX_AUTOMATED_CONFIDENCE: u8 = HUMAN_VERIFIED_CONFIDENCE - 1;

/// Per-field contribution to a confidence score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub score: u8,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

/// Weighted presence score over the extracted fields, capped below 100.
///
/// Pure and order-independent: list contents are only checked for emptiness.
pub fn score_confidence(terms: &ExtractedLoanTerms, weights: &ConfidenceWeights) -> u8 {
    explain_confidence(terms, weights).score
}

pub fn explain_confidence(terms: &ExtractedLoanTerms, weights: &ConfidenceWeights) -> ConfidenceBreakdown {
    let checks: [(&str, bool, u8); 8] = [
        ("loanAmount", terms.loan_amount.is_some(), weights.loan_amount),
        ("interestRate", terms.interest_rate.is_some(), weights.interest_rate),
        ("borrower", has_text(&terms.borrower), weights.borrower),
        ("lender", has_text(&terms.lender), weights.lender),
        ("termMonths", terms.term_months.is_some(), weights.term),
        ("covenants", !terms.covenants.is_empty(), weights.covenants),
        ("fees", !terms.fees.is_empty(), weights.fees),
        ("maturityDate", terms.maturity_date.is_some(), weights.maturity_date),
    ];

    let mut total: u32 = 0;
    let mut present = Vec::new();
    let mut missing = Vec::new();
    for (name, is_present, weight) in checks {
        if is_present {
            total += weight as u32;
            present.push(name.to_string());
        } else {
            missing.push(name.to_string());
        }
    }

    let cap = weights.cap.min(MAX_AUTOMATED_CONFIDENCE) as u32;
    ConfidenceBreakdown {
        score: total.min(cap) as u8,
        present,
        missing,
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}
