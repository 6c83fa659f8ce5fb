use crate::infra::demo_event_drafts;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use event_registration::error::AppError;
use event_registration::registration::{
    AdmissionOutcome, EventAdministration, EventDefinition, EventId, EventRegistrationService,
    InMemoryEventCatalog, InMemoryRegistrationRepository, InMemorySettingsStore, MailError,
    MailTransport, NewRegistration, NotificationSettings, OutboundMail, Registration,
    RegistrationFilter, RegistrationId, RegistrationRepository, RegistrationSubmission,
    RepositoryError, WindowStatus,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for registration windows (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Prints each outbound mail instead of delivering it.
struct ConsoleMail;

impl MailTransport for ConsoleMail {
    fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        println!(
            "    mail [{}] to {}: {}",
            mail.template.key(),
            mail.recipient,
            mail.subject()
        );
        Ok(())
    }
}

/// Store whose writes always fail, used to show the persistence failure path.
struct OfflineRepository;

impl RegistrationRepository for OfflineRepository {
    fn insert(&self, _registration: NewRegistration) -> Result<Registration, RepositoryError> {
        Err(RepositoryError::Unavailable("connection refused".to_string()))
    }

    fn exists(&self, _email: &str, _event_id: EventId) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn fetch(&self, _id: RegistrationId) -> Result<Option<Registration>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _event_id: Option<EventId>) -> Result<Vec<Registration>, RepositoryError> {
        Ok(Vec::new())
    }
}

type DemoService<R> =
    EventRegistrationService<R, InMemoryEventCatalog, ConsoleMail, InMemorySettingsStore>;

fn demo_service<R>(
    repository: Arc<R>,
    catalog: Arc<InMemoryEventCatalog>,
    settings: NotificationSettings,
) -> DemoService<R>
where
    R: RegistrationRepository + 'static,
{
    EventRegistrationService::new(
        repository,
        catalog,
        Arc::new(ConsoleMail),
        Arc::new(InMemorySettingsStore::new(settings)),
        "en",
    )
}

fn attendee(name: &str, email: &str, event: &EventDefinition) -> RegistrationSubmission {
    RegistrationSubmission {
        full_name: name.to_string(),
        email: email.to_string(),
        college_name: "MIT".to_string(),
        department: "CS".to_string(),
        category: Some(event.category),
        event_date: Some(event.event_date),
        event_id: Some(event.id),
    }
}

fn report(label: &str, outcome: &AdmissionOutcome) {
    println!("  {label}: {:?}", outcome.stage());
    match outcome {
        AdmissionOutcome::Completed(receipt) => {
            println!("    {}", receipt.message);
            println!(
                "    notifications: user={:?} admin={:?}",
                receipt.notifications.user, receipt.notifications.admin
            );
        }
        AdmissionOutcome::Rejected(errors) => {
            for (field, message) in errors.messages() {
                println!("    {}: {}", field.label(), message);
            }
        }
        AdmissionOutcome::PersistFailed { message } => println!("    {message}"),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let now: DateTime<Utc> = Utc.from_utc_datetime(&today.and_time(NaiveTime::default()));

    let catalog = Arc::new(InMemoryEventCatalog::default());
    let events = demo_event_drafts(today)
        .into_iter()
        .map(|draft| catalog.define(draft, now))
        .collect::<Result<Vec<_>, _>>()?;

    println!("Event registration demo ({today})");
    println!("\nEvent catalog");
    for event in &events {
        println!(
            "  #{} {} [{}] on {} (registration {} to {}, {:?})",
            event.id,
            event.name,
            event.category.label(),
            event.event_date,
            event.registration_start,
            event.registration_end,
            event.window().status_on(today)
        );
    }

    let Some(open_event) = events
        .iter()
        .find(|event| event.window().status_on(today) == WindowStatus::Open)
        .cloned()
    else {
        println!("\nNo event is open for registration on {today}");
        return Ok(());
    };
    let admin_on = NotificationSettings {
        admin_email: Some("events@example.org".to_string()),
        admin_notifications_enabled: true,
    };

    let repository = Arc::new(InMemoryRegistrationRepository::linked_to(catalog.clone()));
    let service = demo_service(repository, catalog.clone(), admin_on.clone());

    println!("\nAdmission scenarios");
    let jane = attendee("Jane Doe", "jane@example.com", &open_event);
    report("first submission", &service.submit(jane.clone(), now));
    report("repeat submission", &service.submit(jane, now));

    let malformed = attendee("J4ne", "j4ne@example.com", &open_event);
    report("malformed name", &service.submit(malformed, now));

    let offline = demo_service(Arc::new(OfflineRepository), catalog.clone(), admin_on);
    report(
        "storage offline",
        &offline.submit(attendee("John Roe", "john@example.com", &open_event), now),
    );

    let quiet = demo_service(
        Arc::new(InMemoryRegistrationRepository::linked_to(catalog.clone())),
        catalog,
        NotificationSettings {
            admin_email: Some("events@example.org".to_string()),
            admin_notifications_enabled: false,
        },
    );
    report(
        "admin notifications disabled",
        &quiet.submit(attendee("Ada Lovelace", "ada@example.com", &open_event), now),
    );

    println!("\nRegistrations export");
    match service.export_csv(&RegistrationFilter::default()) {
        Ok(bytes) => print!("{}", String::from_utf8_lossy(&bytes)),
        Err(err) => println!("  export unavailable: {err}"),
    }

    Ok(())
}
