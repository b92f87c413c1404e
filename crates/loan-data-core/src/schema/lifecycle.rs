use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Draft,
    Negotiation,
    Documentation,
    Executed,
    Active,
    Matured,
    Cancelled,
    Defaulted,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Draft => "draft",
            LifecycleState::Negotiation => "negotiation",
            LifecycleState::Documentation => "documentation",
            LifecycleState::Executed => "executed",
            LifecycleState::Active => "active",
            LifecycleState::Matured => "matured",
            LifecycleState::Cancelled => "cancelled",
            LifecycleState::Defaulted => "defaulted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Matured | LifecycleState::Cancelled | LifecycleState::Defaulted
        )
    }

    /// States reachable in one step. The pre-activation path is strictly
    /// sequential; `active` fans out to the three terminal states.
    pub fn successors(&self) -> &'static [LifecycleState] {
        match self {
            LifecycleState::Draft => &[LifecycleState::Negotiation],
            LifecycleState::Negotiation => &[LifecycleState::Documentation],
            LifecycleState::Documentation => &[LifecycleState::Executed],
            LifecycleState::Executed => &[LifecycleState::Active],
            LifecycleState::Active => &[
                LifecycleState::Matured,
                LifecycleState::Cancelled,
                LifecycleState::Defaulted,
            ],
            LifecycleState::Matured | LifecycleState::Cancelled | LifecycleState::Defaulted => &[],
        }
    }

    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        self.successors().contains(&next)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub event: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendmentType {
    Pricing,
    Covenant,
    Maturity,
    Amount,
    Other,
}

/// Append-only amendment log entry. Amendments never rewrite the
/// current terms; consumers read the log alongside the current values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amendment {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub amendment_type: AmendmentType,
    pub description: String,
    #[serde(default)]
    pub executed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    #[serde(default)]
    pub state: LifecycleState,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub amendments: Vec<Amendment>,
}

impl Lifecycle {
    /// Dates of milestones that mark the loan as originated (execution or activation).
    pub fn origination_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.milestones
            .iter()
            .filter(|m| {
                m.event == LifecycleState::Executed.as_str()
                    || m.event == LifecycleState::Active.as_str()
            })
            .map(|m| m.date)
    }
}
