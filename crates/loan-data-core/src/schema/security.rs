use serde::{Deserialize, Serialize};

use crate::types::MonetaryAmount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralType {
    RealEstate,
    Equipment,
    Receivables,
    Inventory,
    Securities,
    Cash,
    IntellectualProperty,
    Shares,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LienPriority {
    #[default]
    First,
    Second,
    Subordinated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collateral {
    #[serde(rename = "type")]
    pub collateral_type: CollateralType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MonetaryAmount>,
    #[serde(default)]
    pub lien_priority: LienPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeType {
    Parent,
    Upstream,
    Personal,
    Bank,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guarantee {
    pub guarantor: String,
    #[serde(rename = "type")]
    pub guarantee_type: GuaranteeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<MonetaryAmount>,
}

/// Security package. Absent entirely on the record when unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub secured: bool,
    #[serde(default)]
    pub collateral: Vec<Collateral>,
    #[serde(default)]
    pub guarantees: Vec<Guarantee>,
}
