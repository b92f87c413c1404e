//! Extraction contract: what the document intelligence provider must return
//! for each extraction mode, and the enforcement of that contract on a
//! provider response.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::normalize::{
    amount_field, bool_field, date_field, decimal_field, ensure_consistent_notation, margin_field,
    months_field, rate_field, string_field, string_list, NormalizedRate,
};
use crate::error::{ExtractionError, LoanDataError};
use crate::types::{Bps, Money, Rate};

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Regulatory,
    #[default]
    Institutional,
    Comprehensive,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Regulatory => "regulatory",
            ExtractionMode::Institutional => "institutional",
            ExtractionMode::Comprehensive => "comprehensive",
        }
    }

    /// Blocks the provider must return in addition to the base fields.
    pub fn required_blocks(&self) -> &'static [&'static str] {
        match self {
            ExtractionMode::Regulatory => &[REGULATORY_BLOCK],
            ExtractionMode::Institutional => &[],
            ExtractionMode::Comprehensive => &[ESG_BLOCK, MARKET_BLOCK],
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = LoanDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regulatory" => Ok(ExtractionMode::Regulatory),
            "institutional" => Ok(ExtractionMode::Institutional),
            "comprehensive" => Ok(ExtractionMode::Comprehensive),
            other => Err(LoanDataError::InvalidInput {
                field: "extractionMode".into(),
                reason: format!("unknown extraction mode '{other}'"),
            }),
        }
    }
}

pub const REGULATORY_BLOCK: &str = "regulatoryData";
pub const ESG_BLOCK: &str = "esgProvisions";
pub const MARKET_BLOCK: &str = "marketAnalysis";

/// Base fields every mode asks for, with the shape expected of each.
const BASE_FIELDS: &[(&str, &str)] = &[
    ("loanAmount", "number, principal amount"),
    ("currency", "string, ISO-4217 code"),
    ("interestRate", "number, all-in rate as a decimal fraction (4.75% -> 0.0475)"),
    ("margin", "number or null, margin over the base rate in basis points (e.g. 275)"),
    ("baseRate", "string or null, e.g. SOFR, SONIA, EURIBOR"),
    ("termMonths", "integer, tenor in months"),
    ("maturityDate", "string or null, YYYY-MM-DD"),
    ("borrower", "string, borrower legal name"),
    ("lender", "string, lender or agent of record"),
    ("facilityType", "string, e.g. term loan, revolving credit"),
    ("purpose", "string, use of proceeds"),
    ("covenants", "array of {category, type, description, threshold, operator, unit, testingFrequency}"),
    ("fees", "array of {type, amount, percentage, currency, paymentTiming, description}"),
];

const REGULATORY_FIELDS: &str = "{riskWeighting, capitalRequirement, reportingRequirements[], jurisdiction, applicableRegulations[]}";
const ESG_FIELDS: &str = "{sustainabilityLinked, framework, kpis[{metric, baseline, target, unit, improvementBps, deteriorationBps}], useOfProceeds, verificationRequired}";
const MARKET_FIELDS: &str = "{marketRate, pricingAssessment, comparableDeals[]}";

/// System instruction sent to the provider for a given mode.
pub fn extraction_instruction(mode: ExtractionMode, document_type: &str) -> String {
    let mut out = format!(
        "You are extracting loan terms from a {document_type} document. \
         Respond with a single JSON object and nothing else. \
         Use null for anything the document does not state. \
         Dates must be YYYY-MM-DD. Rates must be decimal fractions.\n\nFields:\n"
    );
    for (name, shape) in BASE_FIELDS {
        out.push_str(&format!("- {name}: {shape}\n"));
    }
    for block in mode.required_blocks() {
        let shape = match *block {
            REGULATORY_BLOCK => REGULATORY_FIELDS,
            ESG_BLOCK => ESG_FIELDS,
            _ => MARKET_FIELDS,
        };
        out.push_str(&format!("- {block} (required): {shape}\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Extracted shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovenantCategory {
    Financial,
    Operational,
    Reporting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCovenant {
    pub category: CovenantCategory,
    #[serde(rename = "type")]
    pub covenant_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_test_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFee {
    #[serde(rename = "type")]
    pub fee_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRegulatoryData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_weighting: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_requirement: Option<Rate>,
    #[serde(default)]
    pub reporting_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub applicable_regulations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedKpi {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_bps: Option<Bps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deterioration_bps: Option<Bps>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEsgProvisions {
    #[serde(default)]
    pub sustainability_linked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default)]
    pub kpis: Vec<ExtractedKpi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_of_proceeds: Option<String>,
    #[serde(default)]
    pub verification_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_assessment: Option<String>,
    #[serde(default)]
    pub comparable_deals: Vec<String>,
}

/// Provider output after contract enforcement: rates are fractions, dates
/// are parsed, mode blocks are present when the mode requires them.
///
/// Everything is optional; nothing here is canonical yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLoanTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Bps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub covenants: Vec<ExtractedCovenant>,
    #[serde(default)]
    pub fees: Vec<ExtractedFee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_data: Option<ExtractedRegulatoryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg_provisions: Option<ExtractedEsgProvisions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_analysis: Option<MarketAnalysis>,
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Parse raw provider text and enforce the contract for `mode`.
pub fn parse_provider_response(
    text: &str,
    mode: ExtractionMode,
) -> Result<ExtractedLoanTerms, ExtractionError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedResponse(format!("response is not valid JSON: {e}")))?;
    let obj = value.as_object().ok_or_else(|| {
        ExtractionError::MalformedResponse("response must be a JSON object".into())
    })?;

    for block in mode.required_blocks() {
        match obj.get(*block) {
            Some(Value::Object(_)) => {}
            _ => {
                return Err(ExtractionError::MissingModeBlock {
                    mode: mode.to_string(),
                    block: (*block).to_string(),
                })
            }
        }
    }

    map_response(obj)
}

/// Providers sometimes wrap JSON in a Markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn map_response(obj: &Map<String, Value>) -> Result<ExtractedLoanTerms, ExtractionError> {
    let mut interest_group: Vec<NormalizedRate> = Vec::new();
    let mut fee_group: Vec<NormalizedRate> = Vec::new();

    let interest_rate = rate_field("interestRate", obj.get("interestRate"))?;
    interest_group.extend(interest_rate);

    let covenants = match obj.get("covenants") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_object().map(|o| (i, o)))
            .map(|(i, o)| map_covenant(i, o))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    let mut fees = Vec::new();
    if let Some(Value::Array(items)) = obj.get("fees") {
        for (i, item) in items.iter().enumerate() {
            let Some(o) = item.as_object() else { continue };
            let percentage = rate_field(&format!("fees[{i}].percentage"), o.get("percentage"))?;
            fee_group.extend(percentage);
            fees.push(ExtractedFee {
                fee_type: string_field(o.get("type")).unwrap_or_else(|| "other".to_string()),
                amount: amount_field(&format!("fees[{i}].amount"), o.get("amount"))?,
                percentage: percentage.map(|r| r.value),
                currency: string_field(o.get("currency")),
                payment_timing: string_field(o.get("paymentTiming")),
                description: string_field(o.get("description")),
            });
        }
    }

    let regulatory_data = match obj.get(REGULATORY_BLOCK) {
        Some(Value::Object(o)) => Some(map_regulatory(o)?),
        _ => None,
    };

    let esg_provisions = match obj.get(ESG_BLOCK) {
        Some(Value::Object(o)) => Some(map_esg(o)?),
        _ => None,
    };

    let market_analysis = match obj.get(MARKET_BLOCK) {
        Some(Value::Object(o)) => {
            let market_rate = rate_field("marketAnalysis.marketRate", o.get("marketRate"))?;
            interest_group.extend(market_rate);
            Some(MarketAnalysis {
                market_rate: market_rate.map(|r| r.value),
                pricing_assessment: string_field(o.get("pricingAssessment")),
                comparable_deals: string_list(o.get("comparableDeals")),
            })
        }
        _ => None,
    };

    ensure_consistent_notation("interest", &interest_group)?;
    ensure_consistent_notation("fee", &fee_group)?;

    Ok(ExtractedLoanTerms {
        loan_amount: amount_field("loanAmount", obj.get("loanAmount"))?,
        currency: string_field(obj.get("currency")),
        interest_rate: interest_rate.map(|r| r.value),
        margin: margin_field("margin", obj.get("margin"))?,
        base_rate: string_field(obj.get("baseRate")),
        term_months: months_field("termMonths", obj.get("termMonths"))?,
        maturity_date: date_field("maturityDate", obj.get("maturityDate"))?,
        borrower: string_field(obj.get("borrower")),
        lender: string_field(obj.get("lender")),
        facility_type: string_field(obj.get("facilityType")),
        purpose: string_field(obj.get("purpose")),
        covenants,
        fees,
        regulatory_data,
        esg_provisions,
        market_analysis,
    })
}

fn map_covenant(i: usize, o: &Map<String, Value>) -> Result<ExtractedCovenant, ExtractionError> {
    let category = match string_field(o.get("category")).map(|c| c.to_ascii_lowercase()) {
        Some(c) if c.starts_with("oper") => CovenantCategory::Operational,
        Some(c) if c.starts_with("report") || c.starts_with("inform") => CovenantCategory::Reporting,
        _ => CovenantCategory::Financial,
    };
    Ok(ExtractedCovenant {
        category,
        covenant_type: string_field(o.get("type")).unwrap_or_else(|| "other".to_string()),
        description: string_field(o.get("description")),
        threshold: decimal_field(&format!("covenants[{i}].threshold"), o.get("threshold"))?,
        operator: string_field(o.get("operator")),
        unit: string_field(o.get("unit")),
        testing_frequency: string_field(o.get("testingFrequency")),
        next_test_date: date_field(&format!("covenants[{i}].nextTestDate"), o.get("nextTestDate"))?,
    })
}

fn map_regulatory(o: &Map<String, Value>) -> Result<ExtractedRegulatoryData, ExtractionError> {
    let capital = rate_field(
        "regulatoryData.capitalRequirement",
        o.get("capitalRequirement"),
    )?;
    Ok(ExtractedRegulatoryData {
        risk_weighting: decimal_field("regulatoryData.riskWeighting", o.get("riskWeighting"))?,
        capital_requirement: capital.map(|r| r.value),
        reporting_requirements: string_list(o.get("reportingRequirements")),
        jurisdiction: string_field(o.get("jurisdiction")),
        applicable_regulations: string_list(o.get("applicableRegulations")),
    })
}

fn map_esg(o: &Map<String, Value>) -> Result<ExtractedEsgProvisions, ExtractionError> {
    let mut kpis = Vec::new();
    if let Some(Value::Array(items)) = o.get("kpis") {
        for (i, item) in items.iter().enumerate() {
            let Some(k) = item.as_object() else { continue };
            let Some(metric) = string_field(k.get("metric")) else { continue };
            kpis.push(ExtractedKpi {
                metric,
                baseline: decimal_field(&format!("kpis[{i}].baseline"), k.get("baseline"))?,
                target: decimal_field(&format!("kpis[{i}].target"), k.get("target"))?,
                unit: string_field(k.get("unit")),
                improvement_bps: decimal_field(&format!("kpis[{i}].improvementBps"), k.get("improvementBps"))?,
                deterioration_bps: decimal_field(&format!("kpis[{i}].deteriorationBps"), k.get("deteriorationBps"))?,
            });
        }
    }
    Ok(ExtractedEsgProvisions {
        sustainability_linked: bool_field(o.get("sustainabilityLinked")),
        framework: string_field(o.get("framework")),
        kpis,
        use_of_proceeds: string_field(o.get("useOfProceeds")),
        verification_required: bool_field(o.get("verificationRequired")),
    })
}
