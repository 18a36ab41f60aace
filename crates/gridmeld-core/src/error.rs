use thiserror::Error as ThisError;

///
/// FieldSetError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FieldSetError {
    #[error("field discovery returned no fields")]
    EmptyResult,
}

///
/// ResolveError
///
/// Failure reported by a context value fetch, carried verbatim from the
/// collaborator. The resolver records it and never retries on its own;
/// the next user-triggered selection or filter edit starts fresh.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("context value fetch failed: {message}")]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
