use std::sync::Arc;

use tracing::warn;

use super::domain::{EventId, NewRegistration, Registration, RegistrationId};

/// Storage abstraction so the admission workflow can be exercised in isolation.
///
/// Implementations must enforce the `(email, event)` uniqueness constraint on
/// `insert`, comparing addresses through [`super::domain::email_key`].
pub trait RegistrationRepository: Send + Sync {
    fn insert(&self, registration: NewRegistration) -> Result<Registration, RepositoryError>;
    fn exists(&self, email: &str, event_id: EventId) -> Result<bool, RepositoryError>;
    fn fetch(&self, id: RegistrationId) -> Result<Option<Registration>, RepositoryError>;
    /// Registrations, optionally limited to one event, in insertion order.
    fn list(&self, event_id: Option<EventId>) -> Result<Vec<Registration>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("registration for {email} and event {event_id} already exists")]
    Duplicate { email: String, event_id: EventId },
    #[error("event {0} does not exist")]
    UnknownEvent(EventId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Answers whether an attendee already holds a registration for an event.
pub struct DuplicateGuard<R> {
    repository: Arc<R>,
}

impl<R> DuplicateGuard<R>
where
    R: RegistrationRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn exists(&self, email: &str, event_id: EventId) -> Result<bool, RepositoryError> {
        self.repository.exists(email, event_id)
    }

    /// Lookup used during validation; a failing store defers to the insert-time constraint.
    pub(crate) fn likely_exists(&self, email: &str, event_id: EventId) -> bool {
        match self.exists(email, event_id) {
            Ok(found) => found,
            Err(error) => {
                warn!(%event_id, %error, "duplicate lookup failed; relying on store constraint");
                false
            }
        }
    }
}
