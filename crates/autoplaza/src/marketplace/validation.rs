use std::fmt;

use serde::Serialize;

/// One rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every violation found while validating a draft; never only the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|violation| violation.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = self
            .violations
            .iter()
            .map(|violation| format!("{}: {}", violation.field, violation.message))
            .collect();
        write!(f, "validation failed ({})", details.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates violations and turns them into a result at the end.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    pub(crate) fn require_text(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

/// Optional leading `+`, then digits with common separators; 7 to 15 digits overall.
pub(crate) fn is_valid_phone(value: &str) -> bool {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if body.is_empty() {
        return false;
    }

    let mut digits = 0;
    for ch in body.chars() {
        match ch {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return false,
        }
    }

    (7..=15).contains(&digits)
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = trimmed.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    domain.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_international_and_formatted_numbers() {
        assert!(is_valid_phone("+52 (55) 1234-5678"));
        assert!(is_valid_phone("5512345678"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("+"));
    }

    #[test]
    fn email_requires_single_at_and_dotted_domain() {
        assert!(is_valid_email("ana.perez@example.mx"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("ana@@example.mx"));
        assert!(!is_valid_email("@example.mx"));
        assert!(!is_valid_email("ana perez@example.mx"));
        assert!(!is_valid_email("ana@example."));
    }

    #[test]
    fn violations_collect_every_field() {
        let mut violations = Violations::default();
        violations.require_text("name", " ");
        violations.require_text("phone", "");
        violations.require_text("city", "Monterrey");

        let err = violations.finish().expect_err("two fields are empty");
        assert_eq!(err.fields(), vec!["name", "phone"]);
        assert!(err.to_string().contains("name: must not be empty"));
    }
}
