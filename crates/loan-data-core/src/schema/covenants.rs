use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestingFrequency {
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
    OnEvent,
}

impl TestingFrequency {
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("month") {
            Some(TestingFrequency::Monthly)
        } else if lower.contains("quarter") {
            Some(TestingFrequency::Quarterly)
        } else if lower.contains("semi") || lower.contains("half") {
            Some(TestingFrequency::SemiAnnually)
        } else if lower.contains("annual") || lower.contains("year") {
            Some(TestingFrequency::Annually)
        } else if lower.contains("event") || lower.contains("incurrence") {
            Some(TestingFrequency::OnEvent)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "=")]
    Equal,
}

impl ComparisonOperator {
    /// Whether `actual` satisfies the threshold `limit` under this operator.
    pub fn holds(&self, actual: Decimal, limit: Decimal) -> bool {
        match self {
            ComparisonOperator::LessThan => actual < limit,
            ComparisonOperator::AtMost => actual <= limit,
            ComparisonOperator::GreaterThan => actual > limit,
            ComparisonOperator::AtLeast => actual >= limit,
            ComparisonOperator::Equal => actual == limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub value: Decimal,
    pub operator: ComparisonOperator,
    /// "x" for multiples, "%" for ratios, or a currency code for absolute tests.
    pub unit: String,
}

// ---------------------------------------------------------------------------
// Financial covenants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialCovenantType {
    Leverage,
    Coverage,
    DebtServiceCoverage,
    Liquidity,
    NetWorth,
    LoanToValue,
    Capex,
    Other,
}

impl FinancialCovenantType {
    pub fn parse_loose(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("debt service") || lower.contains("dscr") {
            FinancialCovenantType::DebtServiceCoverage
        } else if lower.contains("leverage") || lower.contains("debt to ebitda") || lower.contains("debt/ebitda") {
            FinancialCovenantType::Leverage
        } else if lower.contains("coverage") || lower.contains("icr") {
            FinancialCovenantType::Coverage
        } else if lower.contains("liquidity") || lower.contains("current ratio") || lower.contains("cash") {
            FinancialCovenantType::Liquidity
        } else if lower.contains("net worth") || lower.contains("tangible") {
            FinancialCovenantType::NetWorth
        } else if lower.contains("ltv") || lower.contains("loan to value") || lower.contains("loan-to-value") {
            FinancialCovenantType::LoanToValue
        } else if lower.contains("capex") || lower.contains("capital expenditure") {
            FinancialCovenantType::Capex
        } else {
            FinancialCovenantType::Other
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialCovenantStatus {
    #[default]
    Compliant,
    Breach,
    Waived,
    Amended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialCovenant {
    pub id: String,
    #[serde(rename = "type")]
    pub covenant_type: FinancialCovenantType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` when the document names the covenant without stating its level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    pub testing_frequency: TestingFrequency,
    #[serde(default)]
    pub testing_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub status: FinancialCovenantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_test_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_test_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Operational covenants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalCovenantType {
    NegativePledge,
    AssetDisposal,
    ChangeOfControl,
    PariPassu,
    Insurance,
    RestrictedPayments,
    Other,
}

impl OperationalCovenantType {
    pub fn parse_loose(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("negative pledge") {
            OperationalCovenantType::NegativePledge
        } else if lower.contains("disposal") {
            OperationalCovenantType::AssetDisposal
        } else if lower.contains("change of control") {
            OperationalCovenantType::ChangeOfControl
        } else if lower.contains("pari passu") {
            OperationalCovenantType::PariPassu
        } else if lower.contains("insurance") {
            OperationalCovenantType::Insurance
        } else if lower.contains("dividend") || lower.contains("restricted payment") {
            OperationalCovenantType::RestrictedPayments
        } else {
            OperationalCovenantType::Other
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalCovenantStatus {
    #[default]
    Active,
    Inactive,
    Breached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalCovenant {
    pub id: String,
    #[serde(rename = "type")]
    pub covenant_type: OperationalCovenantType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: OperationalCovenantStatus,
}

// ---------------------------------------------------------------------------
// Reporting covenants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingCovenantType {
    FinancialStatements,
    ComplianceCertificate,
    Budget,
    EsgReport,
    Other,
}

impl ReportingCovenantType {
    pub fn parse_loose(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("compliance certificate") {
            ReportingCovenantType::ComplianceCertificate
        } else if lower.contains("financial statement") || lower.contains("accounts") {
            ReportingCovenantType::FinancialStatements
        } else if lower.contains("budget") {
            ReportingCovenantType::Budget
        } else if lower.contains("esg") || lower.contains("sustainab") {
            ReportingCovenantType::EsgReport
        } else {
            ReportingCovenantType::Other
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingStatus {
    #[default]
    Current,
    Overdue,
    Waived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingCovenant {
    pub id: String,
    #[serde(rename = "type")]
    pub covenant_type: ReportingCovenantType,
    pub frequency: TestingFrequency,
    /// Days after period end by which the deliverable is due.
    pub deadline_days: u32,
    #[serde(default)]
    pub status: ReportingStatus,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Covenants {
    #[serde(default)]
    pub financial: Vec<FinancialCovenant>,
    #[serde(default)]
    pub operational: Vec<OperationalCovenant>,
    #[serde(default)]
    pub reporting: Vec<ReportingCovenant>,
}

impl Covenants {
    pub fn is_empty(&self) -> bool {
        self.financial.is_empty() && self.operational.is_empty() && self.reporting.is_empty()
    }

    /// Every covenant id across the three lists, in list order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.financial
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.operational.iter().map(|c| c.id.as_str()))
            .chain(self.reporting.iter().map(|c| c.id.as_str()))
    }

    /// First financial covenant of the given type.
    pub fn financial_of_type(&self, kind: FinancialCovenantType) -> Option<&FinancialCovenant> {
        self.financial.iter().find(|c| c.covenant_type == kind)
    }

    /// Financial plus operational count; reporting deliverables are excluded.
    pub fn testable_count(&self) -> usize {
        self.financial.len() + self.operational.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leverage(id: &str) -> FinancialCovenant {
        FinancialCovenant {
            id: id.into(),
            covenant_type: FinancialCovenantType::Leverage,
            description: None,
            threshold: Some(Threshold {
                value: dec!(3.5),
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

    #[test]
    fn test_operator_semantics() {
        assert!(ComparisonOperator::AtMost.holds(dec!(3.5), dec!(3.5)));
        assert!(!ComparisonOperator::LessThan.holds(dec!(3.5), dec!(3.5)));
        assert!(ComparisonOperator::AtLeast.holds(dec!(2.1), dec!(2.0)));
    }

    #[test]
    fn test_ids_span_all_lists() {
        let covenants = Covenants {
            financial: vec![leverage("fc-1")],
            operational: vec![OperationalCovenant {
                id: "oc-1".into(),
                covenant_type: OperationalCovenantType::NegativePledge,
                description: None,
                status: OperationalCovenantStatus::Active,
            }],
            reporting: vec![ReportingCovenant {
                id: "rc-1".into(),
                covenant_type: ReportingCovenantType::ComplianceCertificate,
                frequency: TestingFrequency::Quarterly,
                deadline_days: 45,
                status: ReportingStatus::Current,
            }],
        };
        let ids: Vec<&str> = covenants.ids().collect();
        assert_eq!(ids, vec!["fc-1", "oc-1", "rc-1"]);
        assert_eq!(covenants.testable_count(), 2);
        assert!(covenants.financial_of_type(FinancialCovenantType::Leverage).is_some());
        assert!(covenants.financial_of_type(FinancialCovenantType::Coverage).is_none());
    }

    #[test]
    fn test_covenant_type_loose_parse() {
        assert_eq!(
            FinancialCovenantType::parse_loose("Maximum Net Leverage Ratio"),
            FinancialCovenantType::Leverage
        );
        assert_eq!(
            FinancialCovenantType::parse_loose("Interest Coverage"),
            FinancialCovenantType::Coverage
        );
        assert_eq!(
            FinancialCovenantType::parse_loose("DSCR"),
            FinancialCovenantType::DebtServiceCoverage
        );
    }

    #[test]
    fn test_operator_wire_names() {
        let json = serde_json::to_string(&ComparisonOperator::AtMost).unwrap();
        assert_eq!(json, "\"<=\"");
    }
}
