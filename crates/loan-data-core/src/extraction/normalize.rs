//! Coercion of loosely typed provider values into decimals, rates and dates.

use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::types::{rate_to_bps, Bps, Rate};

/// Date layouts accepted from providers, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d-%b-%Y",
];

/// How a rate was written by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateNotation {
    /// 0.0475
    Fraction,
    /// 4.75 or "4.75%"
    Percent,
    /// Zero reads the same either way.
    Neutral,
}

/// A rate normalised to a decimal fraction, remembering its source notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedRate {
    pub value: Rate,
    pub notation: RateNotation,
}

/// Parse a date into `NaiveDate`. RFC 3339 timestamps are truncated to the date.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ExtractionError> {
    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    Err(ExtractionError::InvalidDate {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

/// Optional date field: null/empty is absent, anything else must parse.
pub fn date_field(field: &str, value: Option<&Value>) -> Result<Option<NaiveDate>, ExtractionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_date(field, s).map(Some),
        Some(other) => Err(ExtractionError::InvalidDate {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parse a plain decimal: JSON number or numeric string with separators.
pub fn decimal_field(field: &str, value: Option<&Value>) -> Result<Option<Decimal>, ExtractionError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map(Some)
            .map_err(|_| malformed(field, &n.to_string())),
        Some(Value::String(s)) => {
            let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            Decimal::from_str(&cleaned)
                .map(Some)
                .map_err(|_| malformed(field, s))
        }
        Some(other) => Err(malformed(field, &other.to_string())),
    }
}

/// Parse a monetary amount. Accepts ISO currency codes and symbols on
/// either side and k/m/bn multipliers ("USD 250m", "2.5 million GBP",
/// "1.5bn", "500,000"). Any other text rejects the value.
pub fn amount_field(field: &str, value: Option<&Value>) -> Result<Option<Decimal>, ExtractionError> {
    let raw = match value {
        Some(Value::String(s)) => s,
        other => return decimal_field(field, other),
    };
    let lower = raw.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return Ok(None);
    }

    let mut number: Option<Decimal> = None;
    let mut multiplier: Option<Decimal> = None;
    for token in amount_tokens(&lower) {
        match token {
            AmountToken::Number(digits) => {
                if number.is_some() {
                    return Err(malformed(field, raw));
                }
                number = Some(Decimal::from_str(&digits).map_err(|_| malformed(field, raw))?);
            }
            AmountToken::Word(word) => match multiplier_for(&word) {
                Some(m) if multiplier.is_none() => multiplier = Some(m),
                Some(_) => return Err(malformed(field, raw)),
                // currency code
                None if word.len() == 3 => {}
                None => return Err(malformed(field, raw)),
            },
        }
    }

    match number {
        Some(n) => Ok(Some(n * multiplier.unwrap_or(Decimal::ONE))),
        None => Err(malformed(field, raw)),
    }
}

enum AmountToken {
    Number(String),
    Word(String),
}

/// Split into numeric runs and letter runs; separators and currency
/// symbols are dropped.
fn amount_tokens(s: &str) -> Vec<AmountToken> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                match d {
                    '0'..='9' | '.' | '-' => digits.push(d),
                    ',' | '_' => {}
                    _ => break,
                }
                chars.next();
            }
            tokens.push(AmountToken::Number(digits));
        } else if c.is_ascii_alphabetic() {
            let mut word = String::new();
            while let Some(&w) = chars.peek().filter(|w| w.is_ascii_alphabetic()) {
                word.push(w);
                chars.next();
            }
            tokens.push(AmountToken::Word(word));
        } else {
            chars.next();
        }
    }
    tokens
}

fn multiplier_for(word: &str) -> Option<Decimal> {
    match word {
        "billion" | "bn" | "b" => Some(dec!(1_000_000_000)),
        "million" | "mln" | "mm" | "mn" | "m" => Some(dec!(1_000_000)),
        "thousand" | "k" => Some(dec!(1_000)),
        _ => None,
    }
}

/// Parse a rate and normalise it to a decimal fraction.
///
/// An explicit `%` suffix or a bare value above 1 is read as percentage points.
pub fn rate_field(field: &str, value: Option<&Value>) -> Result<Option<NormalizedRate>, ExtractionError> {
    let (number, explicit_percent) = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => {
            let t = s.trim();
            match t.strip_suffix('%') {
                Some(body) => (decimal_field(field, Some(&Value::String(body.to_string())))?, true),
                None => (decimal_field(field, Some(&Value::String(t.to_string())))?, false),
            }
        }
        other => (decimal_field(field, other)?, false),
    };
    let Some(number) = number else {
        return Ok(None);
    };

    let notation = if number.is_zero() {
        RateNotation::Neutral
    } else if explicit_percent || number.abs() > Decimal::ONE {
        RateNotation::Percent
    } else {
        RateNotation::Fraction
    };
    let value = match notation {
        RateNotation::Percent => number / dec!(100),
        _ => number,
    };
    Ok(Some(NormalizedRate { value, notation }))
}

/// Parse a margin into basis points.
///
/// "275 bps" and "275bp" are taken as written; "2.75%" is percentage points.
/// A bare number up to 1 is a decimal fraction (0.0275), anything larger is
/// already basis points.
pub fn margin_field(field: &str, value: Option<&Value>) -> Result<Option<Bps>, ExtractionError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
        other => {
            return Ok(decimal_field(field, other)?.map(bare_margin));
        }
    };
    if text.is_empty() {
        return Ok(None);
    }

    let as_text = |body: &str| decimal_field(field, Some(&Value::String(body.trim().to_string())));
    for suffix in ["basis points", "bps", "bp"] {
        if let Some(body) = text.strip_suffix(suffix) {
            return as_text(body);
        }
    }
    if let Some(body) = text.strip_suffix('%') {
        return Ok(as_text(body)?.map(|pct| rate_to_bps(pct / dec!(100))));
    }
    Ok(as_text(&text)?.map(bare_margin))
}

fn bare_margin(number: Decimal) -> Bps {
    if number.abs() <= Decimal::ONE {
        rate_to_bps(number)
    } else {
        number
    }
}

/// Reject a group of same-type rates that mix fraction and percent notation.
pub fn ensure_consistent_notation(group: &str, rates: &[NormalizedRate]) -> Result<(), ExtractionError> {
    let has_fraction = rates.iter().any(|r| r.notation == RateNotation::Fraction);
    let has_percent = rates.iter().any(|r| r.notation == RateNotation::Percent);
    if has_fraction && has_percent {
        return Err(ExtractionError::InconsistentRateNotation {
            group: group.to_string(),
        });
    }
    Ok(())
}

/// Tenor in whole months from a number or text ("60", "60 months", "5 years").
pub fn months_field(field: &str, value: Option<&Value>) -> Result<Option<u32>, ExtractionError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
        Some(other) => return Err(malformed(field, &other.to_string())),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let years = raw.contains("year");
    let digits: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let n = Decimal::from_str(&digits).map_err(|_| malformed(field, &raw))?;
    let months = if years { n * dec!(12) } else { n };
    months
        .round()
        .to_u32()
        .map(Some)
        .ok_or_else(|| malformed(field, &raw))
}

/// Non-empty trimmed string.
pub fn string_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Array of strings; scalars become a single-element list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| string_field(Some(v))).collect(),
        Some(v) => string_field(Some(v)).into_iter().collect(),
        None => Vec::new(),
    }
}

pub fn bool_field(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "y"),
        _ => false,
    }
}

fn malformed(field: &str, raw: &str) -> ExtractionError {
    ExtractionError::MalformedResponse(format!("field '{field}' has unparseable value {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dates_normalised() {
        let expected = NaiveDate::from_ymd_opt(2030, 3, 15).unwrap();
        for raw in ["2030-03-15", "2030/03/15", "15 March 2030", "March 15, 2030", "2030-03-15T00:00:00Z"] {
            assert_eq!(parse_date("maturityDate", raw).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let err = parse_date("maturityDate", "next spring").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidDate { .. }));
    }

    #[test]
    fn test_percent_rate_normalised() {
        let r = rate_field("interestRate", Some(&json!("4.75%"))).unwrap().unwrap();
        assert_eq!(r.value, dec!(0.0475));
        assert_eq!(r.notation, RateNotation::Percent);

        let r = rate_field("interestRate", Some(&json!(4.75))).unwrap().unwrap();
        assert_eq!(r.value, dec!(0.0475));

        let r = rate_field("interestRate", Some(&json!(0.0475))).unwrap().unwrap();
        assert_eq!(r.value, dec!(0.0475));
        assert_eq!(r.notation, RateNotation::Fraction);
    }

    #[test]
    fn test_mixed_notation_rejected() {
        let rates = [
            rate_field("a", Some(&json!("1%"))).unwrap().unwrap(),
            rate_field("b", Some(&json!(0.005))).unwrap().unwrap(),
        ];
        assert!(ensure_consistent_notation("fee", &rates).is_err());
    }

    #[test]
    fn test_zero_rate_is_neutral() {
        let rates = [
            rate_field("a", Some(&json!(0))).unwrap().unwrap(),
            rate_field("b", Some(&json!(0.005))).unwrap().unwrap(),
        ];
        assert!(ensure_consistent_notation("fee", &rates).is_ok());
    }

    #[test]
    fn test_amount_suffixes() {
        assert_eq!(amount_field("a", Some(&json!("USD 250m"))).unwrap(), Some(dec!(250_000_000)));
        assert_eq!(amount_field("a", Some(&json!("1.5bn"))).unwrap(), Some(dec!(1_500_000_000)));
        assert_eq!(amount_field("a", Some(&json!("500,000"))).unwrap(), Some(dec!(500_000)));
        assert_eq!(amount_field("a", Some(&json!(750000))).unwrap(), Some(dec!(750_000)));
        assert_eq!(amount_field("a", Some(&json!(null))).unwrap(), None);
        assert!(amount_field("a", Some(&json!("lots"))).is_err());
    }

    #[test]
    fn test_amount_currency_after_multiplier() {
        assert_eq!(
            amount_field("a", Some(&json!("2.5 million GBP"))).unwrap(),
            Some(dec!(2_500_000))
        );
        assert_eq!(amount_field("a", Some(&json!("250m USD"))).unwrap(), Some(dec!(250_000_000)));
        assert_eq!(amount_field("a", Some(&json!("$1.2bn"))).unwrap(), Some(dec!(1_200_000_000)));
        assert_eq!(amount_field("a", Some(&json!("EUR 75,000,000"))).unwrap(), Some(dec!(75_000_000)));
    }

    #[test]
    fn test_amount_unknown_words_rejected() {
        assert!(amount_field("a", Some(&json!("250 million approx"))).is_err());
        assert!(amount_field("a", Some(&json!("250m 300m"))).is_err());
        assert!(amount_field("a", Some(&json!("2 million thousand"))).is_err());
    }

    #[test]
    fn test_margin_forms_normalised_to_bps() {
        for raw in [json!("2.75%"), json!("275 bps"), json!("275bp"), json!(275), json!(0.0275), json!("0.0275")] {
            assert_eq!(margin_field("margin", Some(&raw)).unwrap(), Some(dec!(275)), "{raw}");
        }
        assert_eq!(margin_field("margin", Some(&json!("-50 bps"))).unwrap(), Some(dec!(-50)));
        assert_eq!(margin_field("margin", Some(&json!(null))).unwrap(), None);
        assert!(margin_field("margin", Some(&json!("wide"))).is_err());
    }

    #[test]
    fn test_months_from_text() {
        assert_eq!(months_field("t", Some(&json!(60))).unwrap(), Some(60));
        assert_eq!(months_field("t", Some(&json!("36 months"))).unwrap(), Some(36));
        assert_eq!(months_field("t", Some(&json!("5 years"))).unwrap(), Some(60));
    }
}
