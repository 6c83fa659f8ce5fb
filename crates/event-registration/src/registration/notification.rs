use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::domain::{EventDefinition, NotificationSettings, Registration};

const MISSING: &str = "N/A";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Message templates known to the mail transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTemplate {
    UserConfirmation,
    AdminNotification,
}

impl MailTemplate {
    pub const fn key(self) -> &'static str {
        match self {
            MailTemplate::UserConfirmation => "user_confirmation",
            MailTemplate::AdminNotification => "admin_notification",
        }
    }
}

/// Payload handed to the mail transport: template key, recipient, locale, parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMail {
    pub template: MailTemplate,
    pub recipient: String,
    pub locale: String,
    pub params: BTreeMap<String, String>,
}

impl OutboundMail {
    pub fn subject(&self) -> &str {
        self.params.get("subject").map(String::as_str).unwrap_or("")
    }

    pub fn body(&self) -> &str {
        self.params.get("message").map(String::as_str).unwrap_or("")
    }
}

/// Outbound mail delivery.
pub trait MailTransport: Send + Sync {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError>;
}

/// Mail dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected: {0}")]
    Rejected(String),
}

/// What happened to one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Skipped,
    Failed(String),
}

/// Per-recipient results of the notification stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub user: DeliveryStatus,
    pub admin: DeliveryStatus,
}

struct EventFields {
    name: String,
    category: String,
    date: String,
}

impl EventFields {
    fn from(event: Option<&EventDefinition>) -> Self {
        match event {
            Some(event) => Self {
                name: event.name.clone(),
                category: event.category.label().to_string(),
                date: event.event_date.format("%Y-%m-%d").to_string(),
            },
            None => Self {
                name: MISSING.to_string(),
                category: MISSING.to_string(),
                date: MISSING.to_string(),
            },
        }
    }
}

pub(crate) fn user_confirmation_body(
    registration: &Registration,
    event: Option<&EventDefinition>,
) -> String {
    let event = EventFields::from(event);
    format!(
        "Dear {name},\n\nThank you for registering for our event!\n\nEvent Details:\n- Event: {event_name}\n- Category: {category}\n- Date: {date}\n\nWe look forward to seeing you!\n\nBest regards,\nEvent Team",
        name = registration.full_name,
        event_name = event.name,
        category = event.category,
        date = event.date,
    )
}

pub(crate) fn admin_notification_body(
    registration: &Registration,
    event: Option<&EventDefinition>,
) -> String {
    let event = EventFields::from(event);
    format!(
        "New Event Registration\n\nRegistrant Details:\n- Name: {name}\n- Email: {email}\n- College: {college}\n- Department: {department}\n\nEvent Details:\n- Event: {event_name}\n- Category: {category}\n- Date: {date}\n\nRegistration received at: {received}",
        name = registration.full_name,
        email = registration.email,
        college = registration.college_name,
        department = registration.department,
        event_name = event.name,
        category = event.category,
        date = event.date,
        received = registration.created_at.format(TIMESTAMP_FORMAT),
    )
}

/// Best-effort confirmation and admin mails sent after a registration is stored.
///
/// Transport failures are logged and reported, never returned.
pub struct NotificationDispatcher<M> {
    transport: Arc<M>,
    locale: String,
}

impl<M> NotificationDispatcher<M>
where
    M: MailTransport,
{
    pub fn new(transport: Arc<M>, locale: impl Into<String>) -> Self {
        Self {
            transport,
            locale: locale.into(),
        }
    }

    pub fn notify_user(
        &self,
        registration: &Registration,
        event: Option<&EventDefinition>,
    ) -> DeliveryStatus {
        let subject = format!(
            "Registration confirmed: {}",
            event.map(|event| event.name.as_str()).unwrap_or(MISSING)
        );
        let body = user_confirmation_body(registration, event);
        self.deliver(
            MailTemplate::UserConfirmation,
            &registration.email,
            subject,
            body,
        )
    }

    pub fn notify_admin(
        &self,
        registration: &Registration,
        event: Option<&EventDefinition>,
        settings: &NotificationSettings,
    ) -> DeliveryStatus {
        let Some(recipient) = settings.admin_recipient() else {
            debug!(
                registration_id = %registration.id,
                "admin notifications disabled or no admin address configured"
            );
            return DeliveryStatus::Skipped;
        };

        let subject = format!(
            "New registration: {}",
            event.map(|event| event.name.as_str()).unwrap_or(MISSING)
        );
        let body = admin_notification_body(registration, event);
        self.deliver(MailTemplate::AdminNotification, recipient, subject, body)
    }

    fn deliver(
        &self,
        template: MailTemplate,
        recipient: &str,
        subject: String,
        body: String,
    ) -> DeliveryStatus {
        let mut params = BTreeMap::new();
        params.insert("subject".to_string(), subject);
        params.insert("message".to_string(), body);
        let mail = OutboundMail {
            template,
            recipient: recipient.to_string(),
            locale: self.locale.clone(),
            params,
        };

        match self.transport.send(&mail) {
            Ok(()) => {
                info!(template = template.key(), recipient, "notification sent");
                DeliveryStatus::Sent
            }
            Err(err) => {
                error!(template = template.key(), recipient, error = %err, "notification failed");
                DeliveryStatus::Failed(err.to_string())
            }
        }
    }
}
