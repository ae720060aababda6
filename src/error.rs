use thiserror::Error;

/// Reasons the store refuses to add a candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,
    #[error("email is required")]
    EmptyEmail,
    #[error("a candidate with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("rating {0} is outside 0-5")]
    RatingOutOfRange(f64),
}
