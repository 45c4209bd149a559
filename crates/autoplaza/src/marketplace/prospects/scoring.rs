use chrono::{DateTime, Duration, Utc};

use super::domain::Prospect;
use crate::marketplace::lifecycle::StatusMachine;

/// Time windows behind [`is_stale`] and [`is_hot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProspectWindows {
    pub inactivity: Duration,
    pub appointment_horizon: Duration,
    pub fresh_lead: Duration,
}

impl Default for ProspectWindows {
    fn default() -> Self {
        Self {
            inactivity: Duration::days(7),
            appointment_horizon: Duration::hours(48),
            fresh_lead: Duration::hours(24),
        }
    }
}

/// Latest status change, reassignment, or appointment booking; creation otherwise.
pub fn last_activity(prospect: &Prospect) -> DateTime<Utc> {
    [
        prospect.status_changed_at,
        prospect.reassignment_history.last().map(|entry| entry.at),
        prospect
            .appointment
            .as_ref()
            .map(|appointment| appointment.scheduled_at),
    ]
    .into_iter()
    .flatten()
    .fold(prospect.created_at, |latest, at| latest.max(at))
}

/// Open lead with no qualifying activity inside the inactivity window.
pub fn is_stale(prospect: &Prospect, now: DateTime<Utc>, windows: &ProspectWindows) -> bool {
    !prospect.status.is_terminal() && now - last_activity(prospect) > windows.inactivity
}

/// Appointment coming up soon, or a fresh lead from a high-intent channel.
pub fn is_hot(prospect: &Prospect, now: DateTime<Utc>, windows: &ProspectWindows) -> bool {
    let appointment_soon = prospect.appointment.as_ref().map_or(false, |appointment| {
        appointment.at >= now && appointment.at - now <= windows.appointment_horizon
    });
    let fresh_high_intent =
        prospect.source.is_high_intent() && now - prospect.created_at <= windows.fresh_lead;

    appointment_soon || fresh_high_intent
}
