//! Process-local collaborators backing the HTTP service and the demo CLI.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tracing::info;

use super::catalog::{EventAdministration, EventCatalog};
use super::domain::{
    email_key, EventDefinition, EventDraft, EventDraftError, EventId, NewRegistration,
    NotificationSettings, Registration, RegistrationId,
};
use super::notification::{MailError, MailTransport, OutboundMail};
use super::repository::{RegistrationRepository, RepositoryError};
use super::settings::{sanitize, SettingsError, SettingsStore};

#[derive(Default)]
pub struct InMemoryEventCatalog {
    events: RwLock<BTreeMap<EventId, EventDefinition>>,
}

impl EventCatalog for InMemoryEventCatalog {
    fn events(&self) -> Vec<EventDefinition> {
        let guard = self.events.read().expect("catalog lock poisoned");
        guard.values().cloned().collect()
    }

    fn event(&self, id: EventId) -> Option<EventDefinition> {
        let guard = self.events.read().expect("catalog lock poisoned");
        guard.get(&id).cloned()
    }
}

impl EventAdministration for InMemoryEventCatalog {
    fn define(
        &self,
        draft: EventDraft,
        created_at: DateTime<Utc>,
    ) -> Result<EventDefinition, EventDraftError> {
        let mut guard = self.events.write().expect("catalog lock poisoned");
        let next_id = guard.keys().next_back().map_or(1, |id| id.0 + 1);
        let event = draft.into_definition(EventId(next_id), created_at)?;
        guard.insert(event.id, event.clone());
        info!(event_id = %event.id, name = %event.name, "event defined");
        Ok(event)
    }
}

#[derive(Default)]
struct RegistrationTable {
    rows: Vec<Registration>,
    unique: HashSet<(String, EventId)>,
}

/// Append-only registration table with a `(email, event)` unique index.
///
/// When linked to a catalog, inserts referencing a missing event are refused the
/// way a foreign key would refuse them.
#[derive(Default)]
pub struct InMemoryRegistrationRepository {
    table: Mutex<RegistrationTable>,
    events: Option<Arc<dyn EventCatalog>>,
}

impl InMemoryRegistrationRepository {
    pub fn linked_to(events: Arc<dyn EventCatalog>) -> Self {
        Self {
            table: Mutex::default(),
            events: Some(events),
        }
    }
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn insert(&self, registration: NewRegistration) -> Result<Registration, RepositoryError> {
        if let Some(events) = &self.events {
            if events.event(registration.event_id).is_none() {
                return Err(RepositoryError::UnknownEvent(registration.event_id));
            }
        }

        let mut guard = self.table.lock().expect("repository mutex poisoned");
        let key = (email_key(&registration.email), registration.event_id);
        if guard.unique.contains(&key) {
            return Err(RepositoryError::Duplicate {
                email: registration.email,
                event_id: registration.event_id,
            });
        }

        let id = RegistrationId(guard.rows.len() as u64 + 1);
        let stored = Registration::from_new(id, registration);
        guard.unique.insert(key);
        guard.rows.push(stored.clone());
        Ok(stored)
    }

    fn exists(&self, email: &str, event_id: EventId) -> Result<bool, RepositoryError> {
        let guard = self.table.lock().expect("repository mutex poisoned");
        Ok(guard.unique.contains(&(email_key(email), event_id)))
    }

    fn fetch(&self, id: RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        let guard = self.table.lock().expect("repository mutex poisoned");
        Ok(guard.rows.iter().find(|row| row.id == id).cloned())
    }

    fn list(&self, event_id: Option<EventId>) -> Result<Vec<Registration>, RepositoryError> {
        let guard = self.table.lock().expect("repository mutex poisoned");
        Ok(guard
            .rows
            .iter()
            .filter(|row| event_id.map_or(true, |id| row.event_id == id))
            .cloned()
            .collect())
    }
}

pub struct InMemorySettingsStore {
    settings: RwLock<NotificationSettings>,
}

impl InMemorySettingsStore {
    pub fn new(initial: NotificationSettings) -> Self {
        Self {
            settings: RwLock::new(initial),
        }
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new(NotificationSettings::default())
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> NotificationSettings {
        self.settings
            .read()
            .expect("settings lock poisoned")
            .clone()
    }

    fn save(&self, settings: NotificationSettings) -> Result<(), SettingsError> {
        let settings = sanitize(settings)?;
        *self.settings.write().expect("settings lock poisoned") = settings;
        Ok(())
    }
}

/// Transport that records mail in the log instead of delivering it.
#[derive(Default)]
pub struct LogMailTransport;

impl MailTransport for LogMailTransport {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        info!(
            template = mail.template.key(),
            recipient = %mail.recipient,
            locale = %mail.locale,
            subject = mail.subject(),
            "outbound mail"
        );
        Ok(())
    }
}
