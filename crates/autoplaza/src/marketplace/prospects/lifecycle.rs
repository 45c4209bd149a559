use chrono::{DateTime, Utc};

use super::domain::{Appointment, Prospect, ProspectStatus, ReassignmentEntry};
use crate::marketplace::lifecycle::{
    authorize_override, ensure_transition, InvalidTransition, StatusMachine,
};
use crate::marketplace::listings::UserId;
use crate::marketplace::validation::{ValidationError, Violations};

impl StatusMachine for ProspectStatus {
    fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Negotiating => "negotiating",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Discarded => "discarded",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Discarded)
    }

    fn can_transition_to(self, next: Self) -> bool {
        use ProspectStatus::*;

        match (self, next) {
            (New, Contacted) | (Contacted, Qualified) | (Qualified, Negotiating) => true,
            (Negotiating, Won) | (Negotiating, Lost) => true,
            (New | Contacted | Qualified | Negotiating, Discarded) => true,
            (New | Contacted | Qualified | Negotiating | Won | Lost | Discarded, _) => false,
        }
    }
}

/// Error raised by prospect edits that are neither plain transitions nor overrides.
#[derive(Debug, thiserror::Error)]
pub enum ProspectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Closed(#[from] InvalidTransition),
}

impl Prospect {
    pub fn transition_to(
        &mut self,
        next: ProspectStatus,
        at: DateTime<Utc>,
    ) -> Result<(), InvalidTransition> {
        ensure_transition(self.status, next)?;
        self.status = next;
        self.status_changed_at = Some(at);
        Ok(())
    }

    pub fn discard(&mut self, at: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.transition_to(ProspectStatus::Discarded, at)
    }

    /// Hand the lead to another user. Appends to the history; status is untouched.
    pub fn reassign(
        &mut self,
        to: UserId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let mut violations = Violations::default();
        violations.require_text("toUserId", to.as_str());
        if &to == self.assigned_to() {
            violations.push("toUserId", format!("already assigned to '{}'", to.as_str()));
        }
        violations.finish()?;

        let entry = ReassignmentEntry {
            from: self.assigned_to().clone(),
            to,
            at,
            reason: reason
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty()),
        };
        self.reassignment_history.append(entry);
        Ok(())
    }

    pub fn schedule_appointment(
        &mut self,
        at: DateTime<Utc>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ProspectError> {
        if self.status.is_terminal() {
            return Err(InvalidTransition {
                from: self.status.label(),
                to: "appointment_scheduled",
            }
            .into());
        }

        let mut violations = Violations::default();
        if at < now {
            violations.push("appointment.at", "must not be in the past");
        }
        violations.finish()?;

        self.appointment = Some(Appointment {
            at,
            notes,
            scheduled_at: now,
        });
        Ok(())
    }

    /// Set semantics; blank tags are ignored. Returns whether the tag was new.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag.to_string())
    }

    pub fn append_note(&mut self, note: &str, at: DateTime<Utc>) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes
            .push_str(&format!("[{}] {}", at.format("%Y-%m-%d %H:%M"), note));
    }

    pub fn override_status(
        &mut self,
        next: ProspectStatus,
        actor: &UserId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let entry = authorize_override(self.status, next, actor, reason, at)?;
        self.status_overrides.push(entry);
        self.status = next;
        self.status_changed_at = Some(at);
        Ok(())
    }
}
