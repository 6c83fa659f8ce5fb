use super::common::*;
use chrono::Duration;
use std::sync::Arc;

use crate::registration::domain::{EventId, NewRegistration};
use crate::registration::export::{RegistrationFilter, RegistrationListing};
use crate::registration::memory::{InMemoryEventCatalog, InMemoryRegistrationRepository};
use crate::registration::repository::{RegistrationRepository, RepositoryError};

fn seeded() -> RegistrationListing<InMemoryRegistrationRepository, InMemoryEventCatalog> {
    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let entries = [
        ("Jane Doe", "jane@example.com", EventId(1), 0),
        ("John Roe", "john@example.com", EventId(4), 1),
        ("Ada Lovelace", "ada@example.com", EventId(5), 2),
        ("Grace Hopper", "grace@example.com", EventId(99), 3),
    ];
    for (name, email, event_id, offset) in entries {
        repository
            .insert(NewRegistration {
                full_name: name.to_string(),
                email: email.to_string(),
                college_name: "State College".to_string(),
                department: "Physics".to_string(),
                event_id,
                created_at: now() + Duration::minutes(offset),
            })
            .expect("seed insert");
    }
    RegistrationListing::new(repository, catalog())
}

#[test]
fn rows_are_newest_first_with_left_joined_events() {
    let listing = seeded();
    let rows = listing.rows(&RegistrationFilter::default()).expect("rows");
    let names: Vec<&str> = rows.iter().map(|row| row.full_name.as_str()).collect();
    assert_eq!(names, vec!["Grace Hopper", "Ada Lovelace", "John Roe", "Jane Doe"]);

    assert_eq!(rows[0].event_name, None);
    assert_eq!(rows[3].event_name.as_deref(), Some("RustConf"));
    assert_eq!(rows[3].event_category.as_deref(), Some("Conference"));
}

#[test]
fn filters_combine_date_and_event() {
    let listing = seeded();

    let by_date = listing
        .rows(&RegistrationFilter {
            event_date: Some(date(2026, 11, 5)),
            event_id: None,
        })
        .expect("rows");
    assert_eq!(by_date.len(), 2);

    let by_both = listing
        .rows(&RegistrationFilter {
            event_date: Some(date(2026, 11, 5)),
            event_id: Some(EventId(4)),
        })
        .expect("rows");
    assert_eq!(by_both.len(), 1);
    assert_eq!(by_both[0].full_name, "John Roe");

    let mismatched = listing
        .rows(&RegistrationFilter {
            event_date: Some(date(2026, 11, 2)),
            event_id: Some(EventId(4)),
        })
        .expect("rows");
    assert!(mismatched.is_empty());
}

#[test]
fn entries_render_placeholders_for_missing_events() {
    let listing = seeded();
    let entries = listing.entries(&RegistrationFilter::default()).expect("entries");
    assert_eq!(entries[0].event_date, "N/A");
    assert_eq!(entries[3].event_date, "2026-11-05");
    assert_eq!(entries[3].submitted_at, "2026-10-19 12:00:00");
}

#[test]
fn export_writes_header_and_filtered_rows() {
    let listing = seeded();
    let mut buffer = Vec::new();
    let written = listing
        .export_csv(
            &RegistrationFilter {
                event_date: None,
                event_id: Some(EventId(1)),
            },
            &mut buffer,
        )
        .expect("export succeeds");
    assert_eq!(written, 1);

    let text = String::from_utf8(buffer).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Email,College Name,Department,Event Name,Event Date,Event Category,Submission Date")
    );
    assert_eq!(
        lines.next(),
        Some("Jane Doe,jane@example.com,State College,Physics,RustConf,2026-11-05,Conference,2026-10-19 12:00:00")
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn export_surfaces_repository_failures() {
    let listing = RegistrationListing::new(Arc::new(UnavailableRepository), catalog());
    let err = listing
        .export_csv(&RegistrationFilter::default(), Vec::new())
        .expect_err("repository offline");
    assert!(matches!(
        err,
        crate::registration::ExportError::Repository(RepositoryError::Unavailable(_))
    ));
}
