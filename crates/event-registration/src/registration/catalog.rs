use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    EventCategory, EventDefinition, EventDraft, EventDraftError, EventId, RegistrationWindow,
};

/// Read-only queries over configured events.
///
/// The dependent dropdowns of the registration form are plain calls into this
/// trait: category → dates, then category + date → event names.
pub trait EventCatalog: Send + Sync {
    /// Every event, ordered by id.
    fn events(&self) -> Vec<EventDefinition>;

    fn event(&self, id: EventId) -> Option<EventDefinition>;

    /// Distinct event dates for a category, ascending.
    fn dates_for_category(&self, category: EventCategory) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .events()
            .into_iter()
            .filter(|event| event.category == category)
            .map(|event| event.event_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    fn events_for_category_and_date(
        &self,
        category: EventCategory,
        date: NaiveDate,
    ) -> BTreeMap<EventId, String> {
        self.events()
            .into_iter()
            .filter(|event| event.category == category && event.event_date == date)
            .map(|event| (event.id, event.name))
            .collect()
    }

    /// Distinct event dates across all categories, newest first.
    fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .events()
            .into_iter()
            .map(|event| event.event_date)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }

    fn events_on(&self, date: NaiveDate) -> BTreeMap<EventId, String> {
        self.events()
            .into_iter()
            .filter(|event| event.event_date == date)
            .map(|event| (event.id, event.name))
            .collect()
    }

    fn registration_window(&self, id: EventId) -> Result<RegistrationWindow, CatalogError> {
        self.event(id)
            .map(|event| event.window())
            .ok_or(CatalogError::NotFound(id))
    }
}

/// Administrator-side creation of event definitions.
pub trait EventAdministration: Send + Sync {
    fn define(
        &self,
        draft: EventDraft,
        created_at: DateTime<Utc>,
    ) -> Result<EventDefinition, EventDraftError>;
}

/// Catalog lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("event {0} not found")]
    NotFound(EventId),
}
