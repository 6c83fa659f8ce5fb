use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::catalog::EventCatalog;
use super::domain::{EventId, RegistrationWindow};

/// Where a given day falls relative to an event's registration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    Open,
    NotYetOpen,
    Closed,
    UnknownEvent,
}

impl RegistrationWindow {
    /// Both bounds are inclusive.
    pub fn status_on(&self, day: NaiveDate) -> WindowStatus {
        if day < self.start {
            WindowStatus::NotYetOpen
        } else if day > self.end {
            WindowStatus::Closed
        } else {
            WindowStatus::Open
        }
    }
}

/// Day-granularity check of whether registration is currently accepted.
pub struct RegistrationWindowPolicy<C> {
    catalog: Arc<C>,
}

impl<C> RegistrationWindowPolicy<C>
where
    C: EventCatalog,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// Time of day is ignored; days are taken in UTC.
    pub fn is_open(&self, event_id: EventId, now: DateTime<Utc>) -> WindowStatus {
        match self.catalog.registration_window(event_id) {
            Ok(window) => window.status_on(now.date_naive()),
            Err(_) => WindowStatus::UnknownEvent,
        }
    }
}
