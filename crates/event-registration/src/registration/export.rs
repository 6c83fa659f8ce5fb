use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::EventCatalog;
use super::domain::{EventId, Registration};
use super::repository::{RegistrationRepository, RepositoryError};

pub const CSV_HEADER: [&str; 8] = [
    "Name",
    "Email",
    "College Name",
    "Department",
    "Event Name",
    "Event Date",
    "Event Category",
    "Submission Date",
];

const MISSING: &str = "N/A";
const SUBMITTED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MIME type of the CSV download.
pub fn csv_content_type() -> mime::Mime {
    mime::TEXT_CSV_UTF_8
}

/// Download name for an export produced at `at`.
pub fn export_filename(at: NaiveDateTime) -> String {
    format!("event_registrations_{}.csv", at.format("%Y-%m-%d_%H%M%S"))
}

/// Staff-side listing filter; both criteria are optional and combine with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFilter {
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

/// A registration joined with its event; event columns are `None` when the event is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRow {
    pub full_name: String,
    pub email: String,
    pub college_name: String,
    pub department: String,
    pub event_name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub event_category: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl RegistrationRow {
    fn csv_record(&self) -> [String; 8] {
        [
            self.full_name.clone(),
            self.email.clone(),
            self.college_name.clone(),
            self.department.clone(),
            self.event_name.clone().unwrap_or_else(|| MISSING.to_string()),
            self.event_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            self.event_category
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            self.submitted_at.format(SUBMITTED_FORMAT).to_string(),
        ]
    }
}

/// Compact row used by the on-screen listing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub email: String,
    pub event_date: String,
    pub college_name: String,
    pub department: String,
    pub submitted_at: String,
}

impl From<&RegistrationRow> for ListingEntry {
    fn from(row: &RegistrationRow) -> Self {
        Self {
            name: row.full_name.clone(),
            email: row.email.clone(),
            event_date: row
                .event_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            college_name: row.college_name.clone(),
            department: row.department.clone(),
            submitted_at: row.submitted_at.format(SUBMITTED_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv: {0}")]
    Io(#[from] std::io::Error),
}

/// Filterable view over stored registrations.
pub struct RegistrationListing<R, C> {
    repository: Arc<R>,
    catalog: Arc<C>,
}

impl<R, C> RegistrationListing<R, C>
where
    R: RegistrationRepository,
    C: EventCatalog,
{
    pub fn new(repository: Arc<R>, catalog: Arc<C>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// Matching rows, newest submission first.
    pub fn rows(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<RegistrationRow>, RepositoryError> {
        let registrations = self.repository.list(filter.event_id)?;
        let mut rows: Vec<RegistrationRow> = registrations
            .into_iter()
            .map(|registration| self.join(registration))
            .filter(|row| match filter.event_date {
                Some(date) => row.event_date == Some(date),
                None => true,
            })
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }

    pub fn entries(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<ListingEntry>, RepositoryError> {
        Ok(self.rows(filter)?.iter().map(ListingEntry::from).collect())
    }

    pub fn export_csv<W: Write>(
        &self,
        filter: &RegistrationFilter,
        writer: W,
    ) -> Result<usize, ExportError> {
        let rows = self.rows(filter)?;
        write_csv(&rows, writer)?;
        Ok(rows.len())
    }

    fn join(&self, registration: Registration) -> RegistrationRow {
        let event = self.catalog.event(registration.event_id);
        RegistrationRow {
            full_name: registration.full_name,
            email: registration.email,
            college_name: registration.college_name,
            department: registration.department,
            event_name: event.as_ref().map(|event| event.name.clone()),
            event_date: event.as_ref().map(|event| event.event_date),
            event_category: event.as_ref().map(|event| event.category.label().to_string()),
            submitted_at: registration.created_at,
        }
    }
}

/// Header row followed by one record per registration.
pub fn write_csv<W: Write>(rows: &[RegistrationRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.write_record(row.csv_record())?;
    }
    csv_writer.flush()?;
    Ok(())
}
