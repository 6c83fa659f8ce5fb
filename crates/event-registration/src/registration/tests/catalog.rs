use super::common::*;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

use crate::registration::catalog::{CatalogError, EventAdministration, EventCatalog};
use crate::registration::domain::{EventCategory, EventDraftError, EventId, RegistrationWindow};
use crate::registration::memory::InMemoryEventCatalog;
use crate::registration::window::{RegistrationWindowPolicy, WindowStatus};

#[test]
fn dates_for_category_are_distinct_and_ascending() {
    let catalog = catalog();
    assert_eq!(
        catalog.dates_for_category(EventCategory::Conference),
        vec![date(2026, 11, 2), date(2026, 11, 5)]
    );
    assert!(catalog
        .dates_for_category(EventCategory::OnedayWorkshop)
        .is_empty());
}

#[test]
fn events_for_category_and_date_map_ids_to_names() {
    let catalog = catalog();
    let options =
        catalog.events_for_category_and_date(EventCategory::Conference, date(2026, 11, 5));
    assert_eq!(options.len(), 2);
    assert_eq!(options.get(&OPEN_EVENT).map(String::as_str), Some("RustConf"));
    assert_eq!(
        options.get(&EventId(4)).map(String::as_str),
        Some("Embedded Summit")
    );

    assert!(catalog
        .events_for_category_and_date(EventCategory::Hackathon, date(2026, 11, 5))
        .is_empty());
}

#[test]
fn listing_dates_span_categories_newest_first() {
    let catalog = catalog();
    assert_eq!(
        catalog.dates(),
        vec![
            date(2026, 12, 1),
            date(2026, 11, 5),
            date(2026, 11, 2),
            date(2026, 10, 10)
        ]
    );
    assert_eq!(catalog.events_on(date(2026, 11, 5)).len(), 2);
}

#[test]
fn registration_window_resolves_or_reports_not_found() {
    let catalog = catalog();
    assert_eq!(
        catalog.registration_window(OPEN_EVENT),
        Ok(RegistrationWindow {
            start: date(2026, 10, 1),
            end: date(2026, 10, 31)
        })
    );
    assert_eq!(
        catalog.registration_window(EventId(99)),
        Err(CatalogError::NotFound(EventId(99)))
    );
}

#[test]
fn define_assigns_sequential_ids_and_rejects_bad_windows() {
    let catalog = InMemoryEventCatalog::default();
    let created = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
    let mut drafts = drafts().into_iter();

    let first = catalog
        .define(drafts.next().expect("draft"), created)
        .expect("valid");
    let second = catalog
        .define(drafts.next().expect("draft"), created)
        .expect("valid");
    assert_eq!(first.id, EventId(1));
    assert_eq!(second.id, EventId(2));

    let mut broken = drafts.next().expect("draft");
    broken.event_date = date(2026, 9, 15);
    assert!(matches!(
        catalog.define(broken, created),
        Err(EventDraftError::EventBeforeWindowCloses { .. })
    ));
    assert_eq!(catalog.events().len(), 2);
}

#[test]
fn window_policy_classifies_each_side_of_the_window() {
    let policy = RegistrationWindowPolicy::new(catalog());
    assert_eq!(policy.is_open(OPEN_EVENT, now()), WindowStatus::Open);
    assert_eq!(policy.is_open(UPCOMING_EVENT, now()), WindowStatus::NotYetOpen);
    assert_eq!(policy.is_open(CLOSED_EVENT, now()), WindowStatus::Closed);
    assert_eq!(policy.is_open(EventId(42), now()), WindowStatus::UnknownEvent);
}

#[test]
fn window_bounds_are_inclusive_regardless_of_time_of_day() {
    let policy = RegistrationWindowPolicy::new(Arc::new({
        let catalog = InMemoryEventCatalog::default();
        catalog
            .define(drafts().remove(0), now())
            .expect("valid draft");
        catalog
    }));

    let first_day_early = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
    let last_day_late = Utc.with_ymd_and_hms(2026, 10, 31, 23, 59, 59).unwrap();
    let day_before = Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap();
    let day_after = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();

    assert_eq!(policy.is_open(OPEN_EVENT, first_day_early), WindowStatus::Open);
    assert_eq!(policy.is_open(OPEN_EVENT, last_day_late), WindowStatus::Open);
    assert_eq!(policy.is_open(OPEN_EVENT, day_before), WindowStatus::NotYetOpen);
    assert_eq!(policy.is_open(OPEN_EVENT, day_after), WindowStatus::Closed);
}
