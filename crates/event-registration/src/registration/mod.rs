//! Event registration: catalog queries, admission workflow, notifications, and export.
//!
//! A submission flows through [`RegistrationAdmissionWorkflow`]: it is validated against
//! field rules, the duplicate guard, and the event's registration window, then stored, and
//! finally announced by mail. Mail failures are logged and never undo a stored registration.

pub mod catalog;
pub mod domain;
pub mod export;
pub mod memory;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;
pub mod settings;
pub mod validation;
pub mod window;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, EventAdministration, EventCatalog};
pub use domain::{
    email_key, EventCategory, EventDefinition, EventDraft, EventDraftError, EventId,
    NewRegistration, NotificationSettings, Registration, RegistrationField, RegistrationId,
    RegistrationSubmission, RegistrationWindow,
};
pub use export::{
    csv_content_type, export_filename, write_csv, ExportError, ListingEntry, RegistrationFilter,
    RegistrationListing, RegistrationRow, CSV_HEADER,
};
pub use memory::{
    InMemoryEventCatalog, InMemoryRegistrationRepository, InMemorySettingsStore, LogMailTransport,
};
pub use notification::{
    DeliveryStatus, MailError, MailTemplate, MailTransport, NotificationDispatcher,
    NotificationReport, OutboundMail,
};
pub use repository::{DuplicateGuard, RegistrationRepository, RepositoryError};
pub use router::registration_router;
pub use service::{CategoryOption, EventRegistrationService};
pub use settings::{SettingsError, SettingsStore};
pub use validation::{
    check_fields, is_valid_email, FieldError, FieldErrors, RegistrationValidator,
    ValidationVerdict,
};
pub use window::{RegistrationWindowPolicy, WindowStatus};
pub use workflow::{
    AdmissionOutcome, AdmissionReceipt, AdmissionStage, RegistrationAdmissionWorkflow,
    GENERIC_FAILURE_MESSAGE,
};
