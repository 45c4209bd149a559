use chrono::{DateTime, Utc};

use super::domain::{CreditApplication, CreditApplicationStatus};
use crate::marketplace::lifecycle::{
    authorize_override, ensure_transition, InvalidTransition, StatusMachine,
};
use crate::marketplace::listings::UserId;
use crate::marketplace::validation::ValidationError;

impl StatusMachine for CreditApplicationStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Disbursed => "disbursed",
            Self::Cancelled => "cancelled",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Disbursed | Self::Cancelled)
    }

    fn can_transition_to(self, next: Self) -> bool {
        use CreditApplicationStatus::*;

        match (self, next) {
            (Pending, UnderReview) => true,
            (UnderReview, Approved) | (UnderReview, Rejected) => true,
            (Approved, Disbursed) => true,
            (Pending | UnderReview | Approved, Cancelled) => true,
            (Pending | UnderReview | Approved | Rejected | Disbursed | Cancelled, _) => false,
        }
    }
}

impl CreditApplication {
    /// Move along the approval flow. On error nothing is modified.
    pub fn transition_to(
        &mut self,
        next: CreditApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        ensure_transition(self.status, next)?;
        self.status = next;
        self.updated_at = at;
        Ok(())
    }

    /// Applicant withdrawal from any pre-terminal state.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.transition_to(CreditApplicationStatus::Cancelled, at)
    }

    /// Administrative change that ignores the transition table and leaves an audit entry.
    pub fn override_status(
        &mut self,
        next: CreditApplicationStatus,
        actor: &UserId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let entry = authorize_override(self.status, next, actor, reason, at)?;
        self.status_overrides.push(entry);
        self.status = next;
        self.updated_at = at;
        Ok(())
    }
}
