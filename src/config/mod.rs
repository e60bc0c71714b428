pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{load_config, load_config_or_default};
pub use models::*;
pub use validation::{ClientConfigValidator, ConfigValidationResult, ValidationError};
