//! Field-level validation of contact forms.
//!
//! Purely structural and synchronous: nothing here touches the network. Every
//! field is checked independently so the caller can show all problems at once.
use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use validator::ValidateLength;

use crate::core::form::{FormRecord, ServiceCategory};

pub const NAME_MIN_CHARS: u64 = 2;
pub const NAME_MAX_CHARS: u64 = 100;
pub const COMPANY_MIN_CHARS: u64 = 2;
pub const COMPANY_MAX_CHARS: u64 = 100;
pub const MESSAGE_MAX_CHARS: u64 = 2000;

/// `local@domain.tld`, nothing more elaborate.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Throwaway mailbox providers rejected at validation time (lower-case).
static DISPOSABLE_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.insert("tempmail.com");
    set.insert("throwaway.email");
    set.insert("10minutemail.com");
    set.insert("guerrillamail.com");
    set.insert("mailinator.com");
    set
});

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Company,
    Service,
    Message,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Company => "company",
            FormField::Service => "service",
            FormField::Message => "message",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`FormValidator::validate_email`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            valid: false,
            error: Some(message.to_string()),
        }
    }
}

/// Per-field error messages; an empty map means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<FormField, String>,
}

impl ValidationResult {
    fn from_errors(errors: BTreeMap<FormField, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

/// Stateless contact form validator.
pub struct FormValidator;

impl FormValidator {
    /// Check the basic address shape, then the disposable-domain denylist.
    pub fn validate_email(email: &str) -> EmailCheck {
        if !EMAIL_SHAPE.is_match(email) {
            return EmailCheck::rejected("Invalid email format");
        }

        let domain = email
            .split('@')
            .nth(1)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if DISPOSABLE_DOMAINS.contains(domain.as_str()) {
            return EmailCheck::rejected("Please use a business email address");
        }

        EmailCheck::ok()
    }

    /// Validate every field of the record and collect all failures.
    pub fn validate_form_data(record: &FormRecord) -> ValidationResult {
        let mut errors = BTreeMap::new();

        if let Some(message) = Self::check_length(
            &record.name,
            NAME_MIN_CHARS,
            NAME_MAX_CHARS,
            "Name must be at least 2 characters",
            "Name must be less than 100 characters",
        ) {
            errors.insert(FormField::Name, message);
        }

        if record.email.is_empty() {
            errors.insert(FormField::Email, "Email is required".to_string());
        } else if let Some(message) = Self::validate_email(&record.email).error {
            errors.insert(FormField::Email, message);
        }

        if let Some(message) = Self::check_length(
            &record.company,
            COMPANY_MIN_CHARS,
            COMPANY_MAX_CHARS,
            "Company name must be at least 2 characters",
            "Company name must be less than 100 characters",
        ) {
            errors.insert(FormField::Company, message);
        }

        if record.service.parse::<ServiceCategory>().is_err() {
            errors.insert(
                FormField::Service,
                "Please select a valid service".to_string(),
            );
        }

        if let Some(message) = &record.message
            && !message
                .trim()
                .validate_length(None, Some(MESSAGE_MAX_CHARS), None)
        {
            errors.insert(
                FormField::Message,
                "Message must be less than 2000 characters".to_string(),
            );
        }

        if !errors.is_empty() {
            tracing::debug!(
                "Form validation failed for fields: {:?}",
                errors.keys().map(FormField::as_str).collect::<Vec<_>>()
            );
        }

        ValidationResult::from_errors(errors)
    }

    /// Bounds are inclusive and measured in characters after trimming.
    fn check_length(
        value: &str,
        min: u64,
        max: u64,
        too_short: &str,
        too_long: &str,
    ) -> Option<String> {
        let value = value.trim();
        if !value.validate_length(Some(min), None, None) {
            Some(too_short.to_string())
        } else if !value.validate_length(None, Some(max), None) {
            Some(too_long.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> FormRecord {
        FormRecord::new("Grace Hopper", "grace@navy.mil", "US Navy", "cloud")
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let result = FormValidator::validate_form_data(&valid_record());
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_every_service_category_is_accepted() {
        for category in ServiceCategory::ALL {
            let mut record = valid_record();
            record.service = category.as_str().to_string();
            assert!(FormValidator::validate_form_data(&record).is_valid());
        }
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let result = FormValidator::validate_form_data(&FormRecord::default());

        assert!(!result.is_valid());
        assert_eq!(
            result.error(FormField::Name),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(result.error(FormField::Email), Some("Email is required"));
        assert_eq!(
            result.error(FormField::Company),
            Some("Company name must be at least 2 characters")
        );
        assert_eq!(
            result.error(FormField::Service),
            Some("Please select a valid service")
        );
        assert_eq!(result.error(FormField::Message), None);
    }

    #[test]
    fn test_name_length_boundaries() {
        let mut record = valid_record();

        record.name = "A".to_string();
        assert!(
            FormValidator::validate_form_data(&record)
                .error(FormField::Name)
                .is_some()
        );

        record.name = "Al".to_string();
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.name = "n".repeat(100);
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.name = "n".repeat(101);
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Name),
            Some("Name must be less than 100 characters")
        );

        // surrounding whitespace does not count
        record.name = format!("  {}  ", "n".repeat(100));
        assert!(FormValidator::validate_form_data(&record).is_valid());
        record.name = " A ".to_string();
        assert!(!FormValidator::validate_form_data(&record).is_valid());
    }

    #[test]
    fn test_company_length_boundaries() {
        let mut record = valid_record();

        record.company = "X".to_string();
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Company),
            Some("Company name must be at least 2 characters")
        );

        record.company = "XY".to_string();
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.company = "c".repeat(100);
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.company = "c".repeat(101);
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Company),
            Some("Company name must be less than 100 characters")
        );
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let mut record = valid_record();
        record.name = "é".repeat(100);
        assert!(FormValidator::validate_form_data(&record).is_valid());
    }

    #[test]
    fn test_message_limit_counts_trimmed_characters() {
        let mut record = valid_record();

        record.message = Some(format!("\n  {}  \n", "ü".repeat(2000)));
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.message = Some("ü".repeat(2001));
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Message),
            Some("Message must be less than 2000 characters")
        );
    }

    #[test]
    fn test_message_length_boundaries() {
        let mut record = valid_record();

        record.message = Some("m".repeat(2000));
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.message = Some("m".repeat(2001));
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Message),
            Some("Message must be less than 2000 characters")
        );

        record.message = None;
        assert!(FormValidator::validate_form_data(&record).is_valid());

        record.message = Some(String::new());
        assert!(FormValidator::validate_form_data(&record).is_valid());
    }

    #[test]
    fn test_unknown_service_is_rejected() {
        let mut record = valid_record();
        record.service = "blockchain".to_string();
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Service),
            Some("Please select a valid service")
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(FormValidator::validate_email("user@example.com").valid);
        assert!(FormValidator::validate_email("first.last@sub.example.co.uk").valid);

        for bad in [
            "userexample.com",
            "user@",
            "@example.com",
            "user@example",
            "user@@example.com",
            "us er@example.com",
            "",
        ] {
            let check = FormValidator::validate_email(bad);
            assert!(!check.valid, "{bad:?} should be rejected");
            assert_eq!(check.error.as_deref(), Some("Invalid email format"));
        }
    }

    #[test]
    fn test_disposable_domains_rejected_case_insensitively() {
        for email in [
            "x@mailinator.com",
            "X@Mailinator.com",
            "someone@TEMPMAIL.COM",
            "a@10minutemail.com",
            "b@guerrillamail.com",
            "c@throwaway.email",
        ] {
            let check = FormValidator::validate_email(email);
            assert!(!check.valid, "{email} should be rejected");
            assert_eq!(
                check.error.as_deref(),
                Some("Please use a business email address")
            );
        }

        // exact match on the domain, not a suffix match
        assert!(FormValidator::validate_email("x@notmailinator.com").valid);
        assert!(FormValidator::validate_email("x@mail.mailinator.com").valid);
    }

    #[test]
    fn test_disposable_email_in_form_uses_domain_message() {
        let mut record = valid_record();
        record.email = "lead@Mailinator.com".to_string();
        assert_eq!(
            FormValidator::validate_form_data(&record).error(FormField::Email),
            Some("Please use a business email address")
        );
    }
}
