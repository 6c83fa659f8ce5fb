use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::catalog::{EventAdministration, EventCatalog};
use super::domain::{EventCategory, EventDraft, NotificationSettings, RegistrationSubmission};
use super::export::{csv_content_type, export_filename, RegistrationFilter};
use super::notification::MailTransport;
use super::repository::RegistrationRepository;
use super::service::EventRegistrationService;
use super::settings::SettingsStore;
use super::workflow::AdmissionOutcome;

type SharedService<R, C, M, S> = Arc<EventRegistrationService<R, C, M, S>>;

#[derive(Debug, Deserialize)]
pub(crate) struct DatesQuery {
    #[serde(default)]
    category: Option<EventCategory>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OptionsQuery {
    #[serde(default)]
    category: Option<EventCategory>,
    date: NaiveDate,
}

/// Router builder exposing event administration, registration intake, listing, and settings.
pub fn registration_router<R, C, M, S>(service: SharedService<R, C, M, S>) -> Router
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/events",
            get(events_handler::<R, C, M, S>).post(define_event_handler::<R, C, M, S>),
        )
        .route(
            "/api/v1/events/categories",
            get(categories_handler::<R, C, M, S>),
        )
        .route("/api/v1/events/dates", get(dates_handler::<R, C, M, S>))
        .route(
            "/api/v1/events/options",
            get(options_handler::<R, C, M, S>),
        )
        .route(
            "/api/v1/registrations",
            get(listing_handler::<R, C, M, S>).post(submit_handler::<R, C, M, S>),
        )
        .route(
            "/api/v1/registrations/export",
            get(export_handler::<R, C, M, S>),
        )
        .route(
            "/api/v1/settings/notifications",
            get(settings_handler::<R, C, M, S>).put(update_settings_handler::<R, C, M, S>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Json(submission): Json<RegistrationSubmission>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    match service.submit(submission, Utc::now()) {
        AdmissionOutcome::Completed(receipt) => {
            let payload = json!({
                "registration_id": receipt.registration.id,
                "message": receipt.message,
                "notifications": receipt.notifications,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        AdmissionOutcome::Rejected(errors) => {
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        AdmissionOutcome::PersistFailed { message } => {
            let payload = json!({ "error": message });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn events_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    (StatusCode::OK, Json(service.events())).into_response()
}

pub(crate) async fn define_event_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Json(draft): Json<EventDraft>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    match service.define_event(draft, Utc::now()) {
        Ok(event) => (StatusCode::CREATED, Json(event)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn categories_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    (StatusCode::OK, Json(service.categories())).into_response()
}

pub(crate) async fn dates_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Query(query): Query<DatesQuery>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    (StatusCode::OK, Json(service.dates(query.category))).into_response()
}

pub(crate) async fn options_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Query(query): Query<OptionsQuery>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    let options = service.event_options(query.category, query.date);
    (StatusCode::OK, Json(options)).into_response()
}

pub(crate) async fn listing_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Query(filter): Query<RegistrationFilter>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    match service.listing(&filter) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => {
            error!(error = %err, "registration listing failed");
            let payload = json!({ "error": "Failed to load registrations." });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn export_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Query(filter): Query<RegistrationFilter>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    match service.export_csv(&filter) {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_filename(Utc::now().naive_utc())
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, csv_content_type().to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "CSV export failed");
            let payload = json!({ "error": "Failed to export CSV. Please check the logs." });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn settings_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    (StatusCode::OK, Json(service.notification_settings())).into_response()
}

pub(crate) async fn update_settings_handler<R, C, M, S>(
    State(service): State<SharedService<R, C, M, S>>,
    Json(settings): Json<NotificationSettings>,
) -> Response
where
    R: RegistrationRepository + 'static,
    C: EventCatalog + EventAdministration + 'static,
    M: MailTransport + 'static,
    S: SettingsStore + 'static,
{
    match service.update_notification_settings(settings) {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}
