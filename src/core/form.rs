//! Form records, service categories and the payload sent over the wire.
//!
//! A [`FormRecord`] is what the caller collected from the user. The service never
//! mutates it; a [`SubmissionPayload`] is derived from it once per submission and
//! reused verbatim for every attempt.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Subject used when the service string does not name a known category.
pub const DEFAULT_SUBJECT: &str = "General Inquiry";

/// Raw contact form input as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRecord {
    pub name: String,
    pub email: String,
    pub company: String,
    /// Wire name of a [`ServiceCategory`]; unknown values are kept as-is.
    pub service: String,
    pub message: Option<String>,
}

impl FormRecord {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        company: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            company: company.into(),
            service: service.into(),
            message: None,
        }
    }

    /// Attach a free-text message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names of the required fields that are empty. No trimming happens here.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("company", &self.company),
            ("service", &self.service),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// The caller's message, if one was given and it is not blank.
    fn provided_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Service categories a visitor can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Architecture,
    Devops,
    Ai,
    Cloud,
    Security,
    Transformation,
    Consulting,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 7] = [
        ServiceCategory::Architecture,
        ServiceCategory::Devops,
        ServiceCategory::Ai,
        ServiceCategory::Cloud,
        ServiceCategory::Security,
        ServiceCategory::Transformation,
        ServiceCategory::Consulting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Architecture => "architecture",
            ServiceCategory::Devops => "devops",
            ServiceCategory::Ai => "ai",
            ServiceCategory::Cloud => "cloud",
            ServiceCategory::Security => "security",
            ServiceCategory::Transformation => "transformation",
            ServiceCategory::Consulting => "consulting",
        }
    }

    /// Subject line the contact backend files this category under.
    pub fn subject(&self) -> &'static str {
        match self {
            ServiceCategory::Architecture => "Architecture & Design Consultation",
            ServiceCategory::Devops => "DevOps & Operations Inquiry",
            ServiceCategory::Ai => "AI & Machine Learning Project",
            ServiceCategory::Cloud => "Cloud Computing Services",
            ServiceCategory::Security => "Cybersecurity Consultation",
            ServiceCategory::Transformation => "Digital Transformation Initiative",
            ServiceCategory::Consulting => "General Consulting Request",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`ServiceCategory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service category: {0}")]
pub struct UnknownService(pub String);

impl FromStr for ServiceCategory {
    type Err = UnknownService;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

/// Map a raw service string to a subject line, falling back to
/// [`DEFAULT_SUBJECT`] for anything that is not a known category.
pub fn subject_for_service(service: &str) -> &'static str {
    service
        .parse::<ServiceCategory>()
        .map(|category| category.subject())
        .unwrap_or(DEFAULT_SUBJECT)
}

/// JSON body posted to the contact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub company: String,
    pub subject: String,
    pub message: String,
}

impl SubmissionPayload {
    pub fn from_record(record: &FormRecord) -> Self {
        let context = format!(
            "Service Interest: {}\n\nCompany: {}\n\n",
            record.service, record.company
        );
        let message = match record.provided_message() {
            Some(message) => format!("{context}{message}"),
            None => format!(
                "{context}Requesting consultation for {} services.",
                record.service
            ),
        };

        Self {
            name: record.name.trim().to_string(),
            email: record.email.trim().to_lowercase(),
            company: record.company.trim().to_string(),
            subject: subject_for_service(&record.service).to_string(),
            message,
        }
    }
}

impl From<&FormRecord> for SubmissionPayload {
    fn from(record: &FormRecord) -> Self {
        Self::from_record(record)
    }
}
