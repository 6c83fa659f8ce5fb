use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::registration::catalog::EventAdministration;
use crate::registration::domain::{
    EventCategory, EventDraft, EventId, NewRegistration, NotificationSettings, Registration,
    RegistrationId, RegistrationSubmission,
};
use crate::registration::memory::{
    InMemoryEventCatalog, InMemoryRegistrationRepository, InMemorySettingsStore,
};
use crate::registration::notification::{
    MailError, MailTemplate, MailTransport, NotificationDispatcher, OutboundMail,
};
use crate::registration::repository::{RegistrationRepository, RepositoryError};
use crate::registration::service::EventRegistrationService;
use crate::registration::workflow::RegistrationAdmissionWorkflow;

pub(super) const OPEN_EVENT: EventId = EventId(1);
pub(super) const UPCOMING_EVENT: EventId = EventId(2);
pub(super) const CLOSED_EVENT: EventId = EventId(3);

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub(super) fn drafts() -> Vec<EventDraft> {
    vec![
        EventDraft {
            name: "RustConf".to_string(),
            category: EventCategory::Conference,
            event_date: date(2026, 11, 5),
            registration_start: date(2026, 10, 1),
            registration_end: date(2026, 10, 31),
        },
        EventDraft {
            name: "Winter Hack".to_string(),
            category: EventCategory::Hackathon,
            event_date: date(2026, 12, 1),
            registration_start: date(2026, 11, 1),
            registration_end: date(2026, 11, 20),
        },
        EventDraft {
            name: "Async Basics".to_string(),
            category: EventCategory::OnlineWorkshop,
            event_date: date(2026, 10, 10),
            registration_start: date(2026, 9, 1),
            registration_end: date(2026, 9, 30),
        },
        EventDraft {
            name: "Embedded Summit".to_string(),
            category: EventCategory::Conference,
            event_date: date(2026, 11, 5),
            registration_start: date(2026, 10, 1),
            registration_end: date(2026, 11, 1),
        },
        EventDraft {
            name: "Compiler Day".to_string(),
            category: EventCategory::Conference,
            event_date: date(2026, 11, 2),
            registration_start: date(2026, 10, 1),
            registration_end: date(2026, 10, 30),
        },
    ]
}

pub(super) fn catalog() -> Arc<InMemoryEventCatalog> {
    let catalog = Arc::new(InMemoryEventCatalog::default());
    for draft in drafts() {
        catalog
            .define(draft, Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap())
            .expect("fixture event is valid");
    }
    catalog
}

pub(super) fn submission() -> RegistrationSubmission {
    RegistrationSubmission {
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        college_name: "MIT".to_string(),
        department: "CS".to_string(),
        category: Some(EventCategory::Conference),
        event_date: Some(date(2026, 11, 5)),
        event_id: Some(OPEN_EVENT),
    }
}

pub(super) fn admin_settings() -> NotificationSettings {
    NotificationSettings {
        admin_email: Some("events@example.org".to_string()),
        admin_notifications_enabled: true,
    }
}

#[derive(Default)]
pub(super) struct RecordingMail {
    sent: Mutex<Vec<OutboundMail>>,
    attempts: Mutex<Vec<MailTemplate>>,
    failing: Mutex<Vec<MailTemplate>>,
}

impl RecordingMail {
    pub(super) fn failing(templates: &[MailTemplate]) -> Self {
        let mail = Self::default();
        *mail.failing.lock().expect("mail mutex poisoned") = templates.to_vec();
        mail
    }

    pub(super) fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().expect("mail mutex poisoned").clone()
    }

    pub(super) fn attempts(&self) -> Vec<MailTemplate> {
        self.attempts.lock().expect("mail mutex poisoned").clone()
    }
}

impl MailTransport for RecordingMail {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        self.attempts
            .lock()
            .expect("mail mutex poisoned")
            .push(mail.template);
        if self
            .failing
            .lock()
            .expect("mail mutex poisoned")
            .contains(&mail.template)
        {
            return Err(MailError::Transport("smtp relay refused connection".to_string()));
        }
        self.sent
            .lock()
            .expect("mail mutex poisoned")
            .push(mail.clone());
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl RegistrationRepository for UnavailableRepository {
    fn insert(&self, _registration: NewRegistration) -> Result<Registration, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn exists(&self, _email: &str, _event_id: EventId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn fetch(&self, _id: RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _event_id: Option<EventId>) -> Result<Vec<Registration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Store whose lookup misses rows another request committed after the check.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: InMemoryRegistrationRepository,
}

impl RegistrationRepository for RacingRepository {
    fn insert(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
        self.inner.insert(registration)
    }

    fn exists(&self, _email: &str, _event_id: EventId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn fetch(&self, id: RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, event_id: Option<EventId>) -> Result<Vec<Registration>, RepositoryError> {
        self.inner.list(event_id)
    }
}

/// Store whose duplicate lookup fails while inserts still work.
#[derive(Default)]
pub(super) struct FlakyLookupRepository {
    pub(super) inner: InMemoryRegistrationRepository,
}

impl RegistrationRepository for FlakyLookupRepository {
    fn insert(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
        self.inner.insert(registration)
    }

    fn exists(&self, _email: &str, _event_id: EventId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("replica lagging".to_string()))
    }

    fn fetch(&self, id: RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, event_id: Option<EventId>) -> Result<Vec<Registration>, RepositoryError> {
        self.inner.list(event_id)
    }
}

pub(super) type MemoryWorkflow<R> =
    RegistrationAdmissionWorkflow<R, InMemoryEventCatalog, RecordingMail, InMemorySettingsStore>;

pub(super) fn workflow_with<R>(
    repository: Arc<R>,
    mail: Arc<RecordingMail>,
    settings: NotificationSettings,
) -> MemoryWorkflow<R>
where
    R: RegistrationRepository + 'static,
{
    RegistrationAdmissionWorkflow::new(
        repository,
        catalog(),
        NotificationDispatcher::new(mail, "en"),
        Arc::new(InMemorySettingsStore::new(settings)),
    )
}

pub(super) fn build_workflow(
    settings: NotificationSettings,
) -> (
    MemoryWorkflow<InMemoryRegistrationRepository>,
    Arc<InMemoryRegistrationRepository>,
    Arc<RecordingMail>,
) {
    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let mail = Arc::new(RecordingMail::default());
    let workflow = workflow_with(repository.clone(), mail.clone(), settings);
    (workflow, repository, mail)
}

pub(super) type MemoryService = EventRegistrationService<
    InMemoryRegistrationRepository,
    InMemoryEventCatalog,
    RecordingMail,
    InMemorySettingsStore,
>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryRegistrationRepository>,
    Arc<RecordingMail>,
) {
    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let mail = Arc::new(RecordingMail::default());
    let service = EventRegistrationService::new(
        repository.clone(),
        catalog(),
        mail.clone(),
        Arc::new(InMemorySettingsStore::new(admin_settings())),
        "en",
    );
    (service, repository, mail)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
