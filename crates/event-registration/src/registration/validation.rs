use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};

use super::catalog::EventCatalog;
use super::domain::{NewRegistration, RegistrationField, RegistrationSubmission};
use super::repository::{DuplicateGuard, RegistrationRepository};
use super::window::{RegistrationWindowPolicy, WindowStatus};

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

fn letters_only() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z[:space:]]+$").expect("static pattern compiles"))
}

fn letters_and_digits() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9[:space:]]+$").expect("static pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
        )
        .expect("static pattern compiles")
    })
}

/// Syntactic email check: dot-atom local part, dotted hostname domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() > MAX_LOCAL_PART_LEN => false,
        Some(_) => email_pattern().is_match(email),
        None => false,
    }
}

/// The first rule a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    LettersOnly,
    LettersAndDigitsOnly,
    InvalidEmail,
    AlreadyRegistered,
    RegistrationNotStarted,
    RegistrationClosed,
}

impl FieldError {
    pub fn message(self, field: RegistrationField) -> String {
        match self {
            FieldError::Required => format!("{} field is required.", field.label()),
            FieldError::LettersOnly => format!(
                "{} should not contain special characters or numbers.",
                field.label()
            ),
            FieldError::LettersAndDigitsOnly => {
                format!("{} should not contain special characters.", field.label())
            }
            FieldError::InvalidEmail => "Please enter a valid email address.".to_string(),
            FieldError::AlreadyRegistered => {
                "You have already registered for this event.".to_string()
            }
            FieldError::RegistrationNotStarted => "Registration has not started yet.".to_string(),
            FieldError::RegistrationClosed => "Registration for this event is closed.".to_string(),
        }
    }
}

/// Per-field validation failures; one entry per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<RegistrationField, FieldError>,
}

impl FieldErrors {
    pub fn single(field: RegistrationField, error: FieldError) -> Self {
        let mut errors = Self::default();
        errors.record(field, error);
        errors
    }

    /// Keeps the first error recorded for a field.
    pub fn record(&mut self, field: RegistrationField, error: FieldError) {
        self.errors.entry(field).or_insert(error);
    }

    pub fn get(&self, field: RegistrationField) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = RegistrationField> + '_ {
        self.errors.keys().copied()
    }

    /// Rendered messages keyed by field, ready for the submitter.
    pub fn messages(&self) -> BTreeMap<RegistrationField, String> {
        self.errors
            .iter()
            .map(|(field, error)| (*field, error.message(*field)))
            .collect()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages().serialize(serializer)
    }
}

/// Validation result for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Accepted(NewRegistration),
    Rejected(FieldErrors),
}

fn check_text(
    errors: &mut FieldErrors,
    field: RegistrationField,
    value: &str,
    pattern: &Regex,
    violation: FieldError,
) {
    if value.trim().is_empty() {
        errors.record(field, FieldError::Required);
    } else if !pattern.is_match(value) {
        errors.record(field, violation);
    }
}

/// Collaborator-free checks: required fields and character rules.
pub fn check_fields(submission: &RegistrationSubmission) -> FieldErrors {
    let mut errors = FieldErrors::default();

    check_text(
        &mut errors,
        RegistrationField::FullName,
        &submission.full_name,
        letters_only(),
        FieldError::LettersOnly,
    );
    check_text(
        &mut errors,
        RegistrationField::CollegeName,
        &submission.college_name,
        letters_and_digits(),
        FieldError::LettersAndDigitsOnly,
    );
    check_text(
        &mut errors,
        RegistrationField::Department,
        &submission.department,
        letters_only(),
        FieldError::LettersOnly,
    );

    let email = submission.email.trim();
    if email.is_empty() {
        errors.record(RegistrationField::Email, FieldError::Required);
    } else if !is_valid_email(email) {
        errors.record(RegistrationField::Email, FieldError::InvalidEmail);
    }

    if submission.category.is_none() {
        errors.record(RegistrationField::Category, FieldError::Required);
    }
    if submission.event_date.is_none() {
        errors.record(RegistrationField::EventDate, FieldError::Required);
    }
    if submission.event_id.is_none() {
        errors.record(RegistrationField::EventId, FieldError::Required);
    }

    errors
}

/// Combines field rules, the duplicate guard, and the registration window.
pub struct RegistrationValidator<R, C> {
    duplicates: DuplicateGuard<R>,
    window: RegistrationWindowPolicy<C>,
}

impl<R, C> RegistrationValidator<R, C>
where
    R: RegistrationRepository,
    C: EventCatalog,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>) -> Self {
        Self {
            duplicates: DuplicateGuard::new(repository),
            window: RegistrationWindowPolicy::new(catalog),
        }
    }

    pub fn validate(
        &self,
        submission: &RegistrationSubmission,
        now: DateTime<Utc>,
    ) -> ValidationVerdict {
        let mut errors = check_fields(submission);
        let email = submission.email.trim();

        if let Some(event_id) = submission.event_id {
            if errors.get(RegistrationField::Email).is_none()
                && self.duplicates.likely_exists(email, event_id)
            {
                errors.record(RegistrationField::Email, FieldError::AlreadyRegistered);
            }

            match self.window.is_open(event_id, now) {
                WindowStatus::NotYetOpen => {
                    errors.record(RegistrationField::EventId, FieldError::RegistrationNotStarted)
                }
                WindowStatus::Closed => {
                    errors.record(RegistrationField::EventId, FieldError::RegistrationClosed)
                }
                WindowStatus::Open | WindowStatus::UnknownEvent => {}
            }
        }

        match submission.event_id {
            Some(event_id) if errors.is_empty() => ValidationVerdict::Accepted(NewRegistration {
                full_name: submission.full_name.trim().to_string(),
                email: email.to_string(),
                college_name: submission.college_name.trim().to_string(),
                department: submission.department.trim().to_string(),
                event_id,
                created_at: now,
            }),
            _ => ValidationVerdict::Rejected(errors),
        }
    }
}
