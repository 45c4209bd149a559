use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::listings::UserId;
use super::validation::{ValidationError, Violations};

/// Status enum governed by an explicit transition table.
pub trait StatusMachine: Copy + Eq + Debug {
    fn label(self) -> &'static str;
    fn is_terminal(self) -> bool;
    fn can_transition_to(self, next: Self) -> bool;
}

/// Rejected state change; the entity it was attempted on is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid transition from '{from}' to '{to}'")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

pub(crate) fn ensure_transition<S: StatusMachine>(from: S, to: S) -> Result<(), InvalidTransition> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(InvalidTransition {
            from: from.label(),
            to: to.label(),
        })
    }
}

/// Audit entry for an administrative status change outside the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverride<S> {
    pub from: S,
    pub to: S,
    pub actor: UserId,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Builds the audit entry for an override, or every reason it is not acceptable.
pub(crate) fn authorize_override<S: StatusMachine>(
    current: S,
    to: S,
    actor: &UserId,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<StatusOverride<S>, ValidationError> {
    let mut violations = Violations::default();
    violations.require_text("actor", actor.as_str());
    violations.require_text("reason", reason);
    if current == to {
        violations.push("status", format!("already '{}'", current.label()));
    }
    violations.finish()?;

    Ok(StatusOverride {
        from: current,
        to,
        actor: actor.clone(),
        reason: reason.trim().to_string(),
        at,
    })
}
