use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier for a configured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned to an accepted registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed set of event categories offered to attendees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    OnlineWorkshop,
    Hackathon,
    Conference,
    OnedayWorkshop,
}

impl EventCategory {
    pub const ALL: [EventCategory; 4] = [
        EventCategory::OnlineWorkshop,
        EventCategory::Hackathon,
        EventCategory::Conference,
        EventCategory::OnedayWorkshop,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            EventCategory::OnlineWorkshop => "online_workshop",
            EventCategory::Hackathon => "hackathon",
            EventCategory::Conference => "conference",
            EventCategory::OnedayWorkshop => "oneday_workshop",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EventCategory::OnlineWorkshop => "Online Workshop",
            EventCategory::Hackathon => "Hackathon",
            EventCategory::Conference => "Conference",
            EventCategory::OnedayWorkshop => "One-day Workshop",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == raw.trim())
    }
}

/// Inclusive range of calendar days during which sign-ups are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// An event as configured by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: EventId,
    pub name: String,
    pub category: EventCategory,
    pub event_date: NaiveDate,
    pub registration_start: NaiveDate,
    pub registration_end: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl EventDefinition {
    pub fn window(&self) -> RegistrationWindow {
        RegistrationWindow {
            start: self.registration_start,
            end: self.registration_end,
        }
    }
}

/// Administrator input for a new event, checked before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub category: EventCategory,
    pub event_date: NaiveDate,
    pub registration_start: NaiveDate,
    pub registration_end: NaiveDate,
}

/// Reasons an event draft cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventDraftError {
    #[error("Event name is required.")]
    MissingName,
    #[error("Registration end date must be after start date.")]
    WindowInverted { start: NaiveDate, end: NaiveDate },
    #[error("Event date must be after registration end date.")]
    EventBeforeWindowCloses {
        registration_end: NaiveDate,
        event_date: NaiveDate,
    },
}

impl EventDraft {
    /// Enforce `registration_start <= registration_end <= event_date` and assign identity.
    pub fn into_definition(
        self,
        id: EventId,
        created_at: DateTime<Utc>,
    ) -> Result<EventDefinition, EventDraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EventDraftError::MissingName);
        }
        if self.registration_start > self.registration_end {
            return Err(EventDraftError::WindowInverted {
                start: self.registration_start,
                end: self.registration_end,
            });
        }
        if self.event_date < self.registration_end {
            return Err(EventDraftError::EventBeforeWindowCloses {
                registration_end: self.registration_end,
                event_date: self.event_date,
            });
        }

        Ok(EventDefinition {
            id,
            name: name.to_string(),
            category: self.category,
            event_date: self.event_date,
            registration_start: self.registration_start,
            registration_end: self.registration_end,
            created_at,
        })
    }
}

/// Raw attendee input as submitted through the registration form.
///
/// Text fields stay as entered; the dropdown selections are optional because the
/// form can be submitted before they are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSubmission {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub college_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default, deserialize_with = "unselected_as_none")]
    pub category: Option<EventCategory>,
    #[serde(default, deserialize_with = "unselected_as_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "unselected_as_none")]
    pub event_id: Option<EventId>,
}

/// Dropdowns post `""` for their placeholder option; treat it like a missing selection.
fn unselected_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Selection<T> {
        Chosen(T),
        Text(String),
    }

    match Option::<Selection<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Selection::Chosen(value)) => Ok(Some(value)),
        Some(Selection::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Selection::Text(raw)) => Err(serde::de::Error::custom(format!(
            "unrecognized selection '{raw}'"
        ))),
    }
}

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationField {
    FullName,
    Email,
    CollegeName,
    Department,
    Category,
    EventDate,
    EventId,
}

impl RegistrationField {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationField::FullName => "Full Name",
            RegistrationField::Email => "Email Address",
            RegistrationField::CollegeName => "College Name",
            RegistrationField::Department => "Department",
            RegistrationField::Category => "Category of Event",
            RegistrationField::EventDate => "Event Date",
            RegistrationField::EventId => "Event Name",
        }
    }
}

/// A registration that passed validation and is about to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub full_name: String,
    pub email: String,
    pub college_name: String,
    pub department: String,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub full_name: String,
    pub email: String,
    pub college_name: String,
    pub department: String,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn from_new(id: RegistrationId, new: NewRegistration) -> Self {
        Self {
            id,
            full_name: new.full_name,
            email: new.email,
            college_name: new.college_name,
            department: new.department,
            event_id: new.event_id,
            created_at: new.created_at,
        }
    }
}

/// Comparison key for the `(email, event)` uniqueness rule.
///
/// Addresses compare case-insensitively over the whole address, ignoring
/// surrounding whitespace.
pub fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Process-wide admin notification controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub admin_email: Option<String>,
    pub admin_notifications_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_notifications_enabled: true,
        }
    }
}

impl NotificationSettings {
    /// Admin recipient when notifications are switched on and an address is set.
    pub fn admin_recipient(&self) -> Option<&str> {
        if !self.admin_notifications_enabled {
            return None;
        }
        self.admin_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
