use super::domain::CreditApplicationDraft;
use crate::marketplace::validation::{is_valid_email, is_valid_phone, ValidationError, Violations};

/// Checks every intake rule and reports all violations together.
pub fn validate_draft(draft: &CreditApplicationDraft) -> Result<(), ValidationError> {
    let mut violations = Violations::default();
    let personal = &draft.personal_info;

    violations.require_text("personalInfo.name", &personal.name);

    let phone = provided(personal.phone.as_deref());
    let email = provided(personal.email.as_deref());
    let phone_ok = phone.map(is_valid_phone).unwrap_or(false);
    let email_ok = email.map(is_valid_email).unwrap_or(false);

    if !phone_ok && !email_ok {
        match (phone, email) {
            (None, None) => violations.push("personalInfo.contact", "a phone or email is required"),
            (phone, email) => {
                if phone.is_some() {
                    violations.push("personalInfo.phone", "is not a valid phone number");
                }
                if email.is_some() {
                    violations.push("personalInfo.email", "is not a valid email address");
                }
            }
        }
    }

    if draft.financial_info.monthly_income == 0 {
        violations.push("financialInfo.monthlyIncome", "must be greater than zero");
    }

    violations.finish()
}

fn provided(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
