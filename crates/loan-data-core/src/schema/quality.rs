use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

/// A single finding produced by a validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Stable rule name, e.g. `MissingIdentifier`.
    pub rule: String,
    /// Dotted path of the offending field, e.g. `financialTerms.amount.currency`.
    pub field: String,
    pub severity: IssueSeverity,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(rule: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(rule, field, IssueSeverity::Error, message)
    }

    pub fn warning(rule: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(rule, field, IssueSeverity::Warning, message)
    }

    pub fn info(rule: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(rule, field, IssueSeverity::Info, message)
    }

    fn new(rule: &str, field: &str, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            field: field.to_string(),
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule, self.field, self.message)
    }
}

/// Output of the standardizer's last pass over the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    /// Share of optional fields populated, 0–100.
    pub completeness: Decimal,
    /// 100 less deductions for outstanding warnings and info findings, 0–100.
    pub accuracy: Decimal,
    pub last_validated: DateTime<Utc>,
    #[serde(default)]
    pub validation_rules: Vec<String>,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

impl DataQuality {
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
    }
}
