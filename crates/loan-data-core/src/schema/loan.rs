use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::covenants::Covenants;
use super::documentation::Documentation;
use super::esg::EsgProvisions;
use super::facility::FacilityDetails;
use super::fees::Fee;
use super::financial::FinancialTerms;
use super::interoperability::{DataStandard, Interoperability};
use super::lifecycle::{Amendment, Lifecycle, LifecycleState, Milestone};
use super::parties::Parties;
use super::quality::DataQuality;
use super::regulatory::RegulatoryInfo;
use super::security::Security;
use crate::error::LoanDataError;
use crate::LoanDataResult;

/// The canonical loan record.
///
/// Sub-structures are owned by composition. Optional sections (`security`,
/// `esg`) are absent as a whole rather than carried as empty shells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedLoanData {
    pub id: String,
    /// Bumped by every mutation.
    pub version: u64,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub data_standard: DataStandard,
    pub parties: Parties,
    pub financial_terms: FinancialTerms,
    #[serde(default)]
    pub facility: FacilityDetails,
    #[serde(default)]
    pub covenants: Covenants,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    #[serde(default)]
    pub fees: Vec<Fee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg: Option<EsgProvisions>,
    #[serde(default)]
    pub regulatory: RegulatoryInfo,
    #[serde(default)]
    pub documentation: Documentation,
    #[serde(default)]
    pub lifecycle: Lifecycle,
    pub data_quality: DataQuality,
    pub interoperability: Interoperability,
}

impl StandardizedLoanData {
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state
    }

    /// Move the loan to `to`, appending a milestone. Skipping states,
    /// moving backwards and leaving a terminal state all fail.
    pub fn transition(
        &mut self,
        to: LifecycleState,
        date: NaiveDate,
        description: Option<String>,
    ) -> LoanDataResult<&Milestone> {
        let from = self.lifecycle.state;
        if from.is_terminal() {
            return Err(LoanDataError::TerminalState(from));
        }
        if !from.can_transition_to(to) {
            return Err(LoanDataError::InvalidTransition { from, to });
        }

        self.lifecycle.state = to;
        self.lifecycle.milestones.push(Milestone {
            event: to.as_str().to_string(),
            date,
            description,
        });
        self.touch();
        debug!(loan_id = %self.id, %from, %to, version = self.version, "lifecycle transition");

        // just pushed
        Ok(&self.lifecycle.milestones[self.lifecycle.milestones.len() - 1])
    }

    /// Append an amendment to the log. Current terms are left untouched.
    pub fn amend(&mut self, amendment: Amendment) -> LoanDataResult<()> {
        let state = self.lifecycle.state;
        if state.is_terminal() {
            return Err(LoanDataError::TerminalState(state));
        }
        if amendment.id.trim().is_empty() {
            return Err(LoanDataError::InvalidInput {
                field: "amendment.id".into(),
                reason: "amendment id must not be empty".into(),
            });
        }
        if self.lifecycle.amendments.iter().any(|a| a.id == amendment.id) {
            return Err(LoanDataError::InvalidInput {
                field: "amendment.id".into(),
                reason: format!("amendment '{}' already recorded", amendment.id),
            });
        }

        debug!(loan_id = %self.id, amendment_id = %amendment.id, "amendment recorded");
        self.lifecycle.amendments.push(amendment);
        self.touch();
        Ok(())
    }

    /// Bump version and move `last_updated` strictly forward.
    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.last_updated = next_timestamp(Some(self.last_updated), Utc::now());
    }
}

/// `now`, unless that would not move strictly past `previous`.
pub(crate) fn next_timestamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}
