use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Prospect, ProspectDraft, ProspectFilters, ProspectId, ProspectStatus};
use super::lifecycle::ProspectError;
use super::repository::ProspectRepository;
use super::scoring::{is_hot, is_stale, ProspectWindows};
use crate::marketplace::lifecycle::InvalidTransition;
use crate::marketplace::listings::UserId;
use crate::marketplace::repository::RepositoryError;
use crate::marketplace::validation::ValidationError;

/// Service applying the prospect lifecycle over the repository.
pub struct ProspectService<R> {
    repository: Arc<R>,
    windows: ProspectWindows,
}

static PROSPECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_prospect_id() -> ProspectId {
    let id = PROSPECT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProspectId(format!("lead-{id:06}"))
}

/// Follow-up work lists for the sales team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProspectQueues {
    pub stale: Vec<ProspectId>,
    pub hot: Vec<ProspectId>,
}

impl<R> ProspectService<R>
where
    R: ProspectRepository + 'static,
{
    pub fn new(repository: Arc<R>, windows: ProspectWindows) -> Self {
        Self {
            repository,
            windows,
        }
    }

    pub fn windows(&self) -> &ProspectWindows {
        &self.windows
    }

    pub fn create(
        &self,
        draft: ProspectDraft,
        now: DateTime<Utc>,
    ) -> Result<Prospect, ProspectServiceError> {
        let prospect = Prospect::create(next_prospect_id(), draft, now)?;
        Ok(self.repository.insert(prospect)?)
    }

    pub fn get(&self, id: &ProspectId) -> Result<Prospect, ProspectServiceError> {
        Ok(self
            .repository
            .find_by_id(id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn transition(
        &self,
        id: &ProspectId,
        next: ProspectStatus,
        now: DateTime<Utc>,
    ) -> Result<Prospect, ProspectServiceError> {
        self.modify(id, |prospect| Ok(prospect.transition_to(next, now)?))
    }

    pub fn reassign(
        &self,
        id: &ProspectId,
        to: UserId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Prospect, ProspectServiceError> {
        self.modify(id, |prospect| Ok(prospect.reassign(to, reason, now)?))
    }

    pub fn schedule_appointment(
        &self,
        id: &ProspectId,
        at: DateTime<Utc>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Prospect, ProspectServiceError> {
        self.modify(id, |prospect| {
            prospect
                .schedule_appointment(at, notes, now)
                .map_err(ProspectServiceError::from)
        })
    }

    /// Add a note and tags. Neither counts as activity for staleness.
    pub fn annotate(
        &self,
        id: &ProspectId,
        note: Option<&str>,
        tags: &[String],
        now: DateTime<Utc>,
    ) -> Result<Prospect, ProspectServiceError> {
        self.modify(id, |prospect| {
            if let Some(note) = note {
                prospect.append_note(note, now);
            }
            for tag in tags {
                prospect.add_tag(tag);
            }
            Ok(())
        })
    }

    pub fn override_status(
        &self,
        id: &ProspectId,
        next: ProspectStatus,
        actor: &UserId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Prospect, ProspectServiceError> {
        self.modify(id, |prospect| {
            Ok(prospect.override_status(next, actor, reason, now)?)
        })
    }

    pub fn stale(
        &self,
        filters: &ProspectFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Prospect>, ProspectServiceError> {
        Ok(self
            .matching(filters)?
            .into_iter()
            .filter(|prospect| is_stale(prospect, now, &self.windows))
            .collect())
    }

    pub fn hot(
        &self,
        filters: &ProspectFilters,
        now: DateTime<Utc>,
    ) -> Result<Vec<Prospect>, ProspectServiceError> {
        Ok(self
            .matching(filters)?
            .into_iter()
            .filter(|prospect| is_hot(prospect, now, &self.windows))
            .collect())
    }

    pub fn queues(
        &self,
        filters: &ProspectFilters,
        now: DateTime<Utc>,
    ) -> Result<ProspectQueues, ProspectServiceError> {
        let prospects = self.matching(filters)?;
        let mut queues = ProspectQueues::default();
        for prospect in &prospects {
            if is_stale(prospect, now, &self.windows) {
                queues.stale.push(prospect.id.clone());
            }
            if is_hot(prospect, now, &self.windows) {
                queues.hot.push(prospect.id.clone());
            }
        }
        Ok(queues)
    }

    fn matching(&self, filters: &ProspectFilters) -> Result<Vec<Prospect>, RepositoryError> {
        Ok(self
            .repository
            .find_many(filters)?
            .into_iter()
            .filter(|prospect| filters.matches(prospect))
            .collect())
    }

    fn modify<F>(&self, id: &ProspectId, edit: F) -> Result<Prospect, ProspectServiceError>
    where
        F: FnOnce(&mut Prospect) -> Result<(), ProspectServiceError>,
    {
        let mut prospect = self.get(id)?;
        edit(&mut prospect)?;
        self.repository.update(prospect.clone())?;
        Ok(prospect)
    }
}

/// Error raised by the prospect service.
#[derive(Debug, thiserror::Error)]
pub enum ProspectServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ProspectError> for ProspectServiceError {
    fn from(value: ProspectError) -> Self {
        match value {
            ProspectError::Validation(err) => Self::Validation(err),
            ProspectError::Closed(err) => Self::Transition(err),
        }
    }
}
