use chrono::{DateTime, Utc};

use super::domain::{Prospect, ProspectDraft, ProspectId, ProspectSource, ProspectStatus};
use crate::marketplace::validation::{ValidationError, Violations};

/// Checks every intake rule and reports all violations together.
pub fn validate_draft(draft: &ProspectDraft) -> Result<(), ValidationError> {
    let mut violations = Violations::default();
    violations.require_text("name", &draft.name);
    violations.require_text("phone", &draft.phone);
    if ProspectSource::parse(&draft.source).is_none() {
        violations.push(
            "source",
            format!("'{}' is not a known acquisition channel", draft.source.trim()),
        );
    }
    violations.require_text("createdBy", draft.created_by.as_str());
    if let Some(budget) = draft.budget {
        if budget.min > budget.max {
            violations.push("budget", "min must not exceed max");
        }
    }
    violations.finish()
}

impl Prospect {
    /// Validate `draft` and build a `new` prospect owned by its creator.
    pub fn create(
        id: ProspectId,
        draft: ProspectDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_draft(&draft)?;
        let source = ProspectSource::parse(&draft.source).unwrap_or(ProspectSource::Other);

        let mut prospect = Self {
            id,
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            email: draft.email,
            source,
            status: ProspectStatus::New,
            listing_id: draft.listing_id,
            budget: draft.budget,
            message: draft.message,
            notes: String::new(),
            tags: Default::default(),
            appointment: None,
            created_by: draft.created_by,
            reassignment_history: Default::default(),
            status_overrides: Vec::new(),
            created_at: now,
            status_changed_at: None,
        };
        for tag in &draft.tags {
            prospect.add_tag(tag);
        }
        Ok(prospect)
    }
}
