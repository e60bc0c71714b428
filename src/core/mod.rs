pub mod backoff;
pub mod deadline;
pub mod error;
pub mod form;
pub mod progress;
pub mod submission;
pub mod validator;

pub use backoff::BackoffPolicy;
pub use deadline::AttemptDeadline;
pub use error::SubmissionError;
pub use form::{FormRecord, ServiceCategory, SubmissionPayload, subject_for_service};
pub use progress::{ProgressCallback, ProgressEvent, ProgressStatus};
pub use submission::{FormSubmissionService, SubmissionResult, SubmitOptions};
pub use validator::{EmailCheck, FormField, FormValidator, ValidationResult};
