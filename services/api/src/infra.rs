use chrono::{DateTime, Duration, NaiveDate, Utc};
use event_registration::config::NotificationConfig;
use event_registration::registration::{
    EventCategory, EventDefinition, EventDraft, EventDraftError, EventRegistrationService,
    InMemoryEventCatalog, InMemoryRegistrationRepository, InMemorySettingsStore,
    LogMailTransport,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiService = EventRegistrationService<
    InMemoryRegistrationRepository,
    InMemoryEventCatalog,
    LogMailTransport,
    InMemorySettingsStore,
>;

/// Wires the in-memory collaborators; registrations referencing unknown events are refused.
pub(crate) fn build_service(notifications: &NotificationConfig) -> Arc<ApiService> {
    let catalog = Arc::new(InMemoryEventCatalog::default());
    let repository = Arc::new(InMemoryRegistrationRepository::linked_to(catalog.clone()));
    let settings = Arc::new(InMemorySettingsStore::new(notifications.settings()));

    Arc::new(EventRegistrationService::new(
        repository,
        catalog,
        Arc::new(LogMailTransport),
        settings,
        notifications.locale.clone(),
    ))
}

/// Sample events placed around `today`: one open, one not yet open, one closed.
pub(crate) fn demo_event_drafts(today: NaiveDate) -> Vec<EventDraft> {
    let day = |offset: i64| today + Duration::days(offset);
    vec![
        EventDraft {
            name: "Systems Programming Conference".to_string(),
            category: EventCategory::Conference,
            event_date: day(21),
            registration_start: day(-10),
            registration_end: day(14),
        },
        EventDraft {
            name: "Campus Hackathon".to_string(),
            category: EventCategory::Hackathon,
            event_date: day(40),
            registration_start: day(7),
            registration_end: day(30),
        },
        EventDraft {
            name: "Intro to Embedded Rust".to_string(),
            category: EventCategory::OnlineWorkshop,
            event_date: day(-1),
            registration_start: day(-30),
            registration_end: day(-3),
        },
        EventDraft {
            name: "Parser Combinators Lab".to_string(),
            category: EventCategory::OnedayWorkshop,
            event_date: day(21),
            registration_start: day(-2),
            registration_end: day(20),
        },
    ]
}

pub(crate) fn seed_demo_events(
    service: &ApiService,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Vec<EventDefinition>, EventDraftError> {
    demo_event_drafts(today)
        .into_iter()
        .map(|draft| service.define_event(draft, now))
        .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
