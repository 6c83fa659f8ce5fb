use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::catalog::EventCatalog;
use super::domain::{Registration, RegistrationField, RegistrationSubmission};
use super::notification::{MailTransport, NotificationDispatcher, NotificationReport};
use super::repository::{RegistrationRepository, RepositoryError};
use super::settings::SettingsStore;
use super::validation::{FieldError, FieldErrors, RegistrationValidator, ValidationVerdict};

/// Shown to the submitter when the registration could not be stored.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Stages an admission run passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStage {
    Received,
    Validating,
    Rejected,
    Validated,
    Persisting,
    PersistFailed,
    Persisted,
    Notifying,
    Completed,
}

impl AdmissionStage {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            AdmissionStage::Rejected | AdmissionStage::PersistFailed | AdmissionStage::Completed
        )
    }

    pub const fn can_advance_to(self, next: AdmissionStage) -> bool {
        use AdmissionStage::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Rejected)
                | (Validating, Validated)
                | (Validated, Persisting)
                | (Persisting, PersistFailed)
                | (Persisting, Persisted)
                | (Persisting, Rejected)
                | (Persisted, Notifying)
                | (Notifying, Completed)
        )
    }
}

/// Accepted registration plus what the submitter should be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionReceipt {
    pub registration: Registration,
    pub message: String,
    pub notifications: NotificationReport,
}

/// Terminal result of one admission run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Completed(AdmissionReceipt),
    Rejected(FieldErrors),
    PersistFailed { message: &'static str },
}

impl AdmissionOutcome {
    pub fn stage(&self) -> AdmissionStage {
        match self {
            AdmissionOutcome::Completed(_) => AdmissionStage::Completed,
            AdmissionOutcome::Rejected(_) => AdmissionStage::Rejected,
            AdmissionOutcome::PersistFailed { .. } => AdmissionStage::PersistFailed,
        }
    }
}

/// Tracks the current stage so every transition is checked and traced.
struct AdmissionRun {
    stage: AdmissionStage,
}

impl AdmissionRun {
    fn start() -> Self {
        Self {
            stage: AdmissionStage::Received,
        }
    }

    fn advance(&mut self, next: AdmissionStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid admission transition {:?} -> {:?}",
            self.stage,
            next
        );
        debug!(from = ?self.stage, to = ?next, "admission stage");
        self.stage = next;
    }
}

/// Validate → persist → notify for a single submission.
pub struct RegistrationAdmissionWorkflow<R, C, M, S> {
    validator: RegistrationValidator<R, C>,
    repository: Arc<R>,
    catalog: Arc<C>,
    dispatcher: NotificationDispatcher<M>,
    settings: Arc<S>,
}

impl<R, C, M, S> RegistrationAdmissionWorkflow<R, C, M, S>
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        catalog: Arc<C>,
        dispatcher: NotificationDispatcher<M>,
        settings: Arc<S>,
    ) -> Self {
        Self {
            validator: RegistrationValidator::new(repository.clone(), catalog.clone()),
            repository,
            catalog,
            dispatcher,
            settings,
        }
    }

    pub fn validator(&self) -> &RegistrationValidator<R, C> {
        &self.validator
    }

    pub fn admit(
        &self,
        submission: RegistrationSubmission,
        now: DateTime<Utc>,
    ) -> AdmissionOutcome {
        let mut run = AdmissionRun::start();

        run.advance(AdmissionStage::Validating);
        let candidate = match self.validator.validate(&submission, now) {
            ValidationVerdict::Accepted(candidate) => candidate,
            ValidationVerdict::Rejected(errors) => {
                run.advance(AdmissionStage::Rejected);
                info!(fields = ?errors.fields().collect::<Vec<_>>(), "registration rejected");
                return AdmissionOutcome::Rejected(errors);
            }
        };
        run.advance(AdmissionStage::Validated);

        run.advance(AdmissionStage::Persisting);
        let registration = match self.repository.insert(candidate) {
            Ok(registration) => registration,
            Err(RepositoryError::Duplicate { event_id, .. }) => {
                run.advance(AdmissionStage::Rejected);
                warn!(%event_id, "duplicate registration caught by store constraint");
                return AdmissionOutcome::Rejected(FieldErrors::single(
                    RegistrationField::Email,
                    FieldError::AlreadyRegistered,
                ));
            }
            Err(err) => {
                run.advance(AdmissionStage::PersistFailed);
                error!(error = %err, "registration save failed");
                return AdmissionOutcome::PersistFailed {
                    message: GENERIC_FAILURE_MESSAGE,
                };
            }
        };
        run.advance(AdmissionStage::Persisted);
        info!(
            registration_id = %registration.id,
            event_id = %registration.event_id,
            "registration stored"
        );

        run.advance(AdmissionStage::Notifying);
        let event = self.catalog.event(registration.event_id);
        let user = self.dispatcher.notify_user(&registration, event.as_ref());
        let settings = self.settings.load();
        let admin = self
            .dispatcher
            .notify_admin(&registration, event.as_ref(), &settings);

        run.advance(AdmissionStage::Completed);
        let message = format!(
            "Thank you, {}! Your registration has been submitted successfully.",
            registration.full_name
        );
        AdmissionOutcome::Completed(AdmissionReceipt {
            registration,
            message,
            notifications: NotificationReport { user, admin },
        })
    }
}
