use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::catalog::{EventAdministration, EventCatalog};
use super::domain::{
    EventCategory, EventDefinition, EventDraft, EventDraftError, EventId, NotificationSettings,
    RegistrationSubmission,
};
use super::export::{ExportError, ListingEntry, RegistrationFilter, RegistrationListing};
use super::notification::{MailTransport, NotificationDispatcher};
use super::repository::{RegistrationRepository, RepositoryError};
use super::settings::{SettingsError, SettingsStore};
use super::workflow::{AdmissionOutcome, RegistrationAdmissionWorkflow};

/// Dropdown entry for the category selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub key: EventCategory,
    pub label: &'static str,
}

/// Facade composing the admission workflow with the catalog, listing, and settings.
pub struct EventRegistrationService<R, C, M, S> {
    workflow: RegistrationAdmissionWorkflow<R, C, M, S>,
    listing: RegistrationListing<R, C>,
    catalog: Arc<C>,
    settings: Arc<S>,
}

impl<R, C, M, S> EventRegistrationService<R, C, M, S>
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        catalog: Arc<C>,
        transport: Arc<M>,
        settings: Arc<S>,
        locale: impl Into<String>,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(transport, locale);
        let workflow = RegistrationAdmissionWorkflow::new(
            repository.clone(),
            catalog.clone(),
            dispatcher,
            settings.clone(),
        );
        let listing = RegistrationListing::new(repository, catalog.clone());

        Self {
            workflow,
            listing,
            catalog,
            settings,
        }
    }

    pub fn submit(
        &self,
        submission: RegistrationSubmission,
        now: DateTime<Utc>,
    ) -> AdmissionOutcome {
        self.workflow.admit(submission, now)
    }

    pub fn define_event(
        &self,
        draft: EventDraft,
        now: DateTime<Utc>,
    ) -> Result<EventDefinition, EventDraftError> {
        self.catalog.define(draft, now)
    }

    pub fn events(&self) -> Vec<EventDefinition> {
        self.catalog.events()
    }

    pub fn categories(&self) -> Vec<CategoryOption> {
        EventCategory::ALL
            .into_iter()
            .map(|key| CategoryOption {
                key,
                label: key.label(),
            })
            .collect()
    }

    /// Registration form: dates for a category. Listing filter: every date, newest first.
    pub fn dates(&self, category: Option<EventCategory>) -> Vec<NaiveDate> {
        match category {
            Some(category) => self.catalog.dates_for_category(category),
            None => self.catalog.dates(),
        }
    }

    pub fn event_options(
        &self,
        category: Option<EventCategory>,
        date: NaiveDate,
    ) -> BTreeMap<EventId, String> {
        match category {
            Some(category) => self.catalog.events_for_category_and_date(category, date),
            None => self.catalog.events_on(date),
        }
    }

    pub fn listing(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<ListingEntry>, RepositoryError> {
        self.listing.entries(filter)
    }

    pub fn export_csv(&self, filter: &RegistrationFilter) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        self.listing.export_csv(filter, &mut buffer)?;
        Ok(buffer)
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        self.settings.load()
    }

    pub fn update_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> Result<NotificationSettings, SettingsError> {
        self.settings.save(settings)?;
        Ok(self.settings.load())
    }
}
