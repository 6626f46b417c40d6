//! Command-line driver over the booking services.

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};

use crate::api::{AppointmentApi, AuthApi, DirectoryApi, NotificationApi};
use crate::domain::notification::NotificationStatus;
use crate::domain::types::{CountyId, InstitutionId, ServiceId};
use crate::forms::appointment::{UserGroup, combine_date_and_time};
use crate::forms::login::LoginForm;
use crate::models::config::ClientConfig;
use crate::services::appointments::search_customer_appointments;
use crate::services::confirmation::{calendar_link, qr_code_url};
use crate::services::dashboard::{load_dashboard, service_type_label};
use crate::services::notifications::list_notifications;
use crate::services::session::{SessionContext, StoredSession};
use crate::services::submission::SubmissionOutcome;
use crate::services::wizard::{BookingWizard, WizardState};
use crate::services::{ServiceError, ServiceResult};
use crate::storage::LocalStorage;

#[derive(Debug, Parser)]
#[command(name = "civic-booking", version, about = "Book appointments at public institutions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List counties
    Counties,
    /// Restore and show the saved draft
    Resume,
    /// Select the county of the draft
    County {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
    },
    /// Select an institution of the draft's county
    Institution {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
    },
    /// Select a service offered by the institution
    Service {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
    },
    /// Select the appointment date (YYYY-MM-DD)
    Date { date: NaiveDate },
    /// Select one of the offered times (HH:MM)
    Time {
        #[arg(value_parser = parse_time)]
        time: NaiveTime,
    },
    /// Set the contact details
    Contact {
        name: String,
        email: String,
        phone: String,
    },
    /// Move the draft to a wizard step
    Step { step: u32 },
    /// Submit the saved draft
    Submit,
    /// Discard the saved draft
    Reset,
    /// List appointments booked under an email
    Appointments { email: String },
    /// Sign in
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Show appointment statistics
    Dashboard,
    /// List notifications (admin only)
    Notifications {
        #[arg(value_enum, ignore_case = true)]
        status: Option<NotificationStatus>,
    },
}

fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

/// Runs `command` and returns the text to print.
pub fn run<A, S>(
    command: Command,
    api: A,
    storage: S,
    config: &ClientConfig,
) -> ServiceResult<String>
where
    A: DirectoryApi + AppointmentApi + AuthApi + NotificationApi,
    S: LocalStorage,
{
    let redirect_after = Duration::from_millis(config.success_redirect_delay_ms);

    match command {
        Command::Counties => {
            let counties = api.list_counties()?;
            Ok(counties
                .iter()
                .map(|c| format!("{}\t{}", c.id, c.name))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Resume => {
            let mut wizard = BookingWizard::new(api, storage, redirect_after);
            wizard.load_counties()?;
            match wizard.resume()? {
                Some(report) => {
                    let mut lines = describe_draft(wizard.state());
                    if let Some(step) = report.stopped_at {
                        lines.push(format!("Restored up to: {step}"));
                    }
                    Ok(lines.join("\n"))
                }
                None => Ok("No saved draft.".to_string()),
            }
        }
        Command::County { id } => {
            let county = CountyId::new(id)?;
            edit_draft(api, storage, redirect_after, |wizard| {
                wizard.select_county(county).map(|_| ())
            })
        }
        Command::Institution { id } => {
            let institution = InstitutionId::new(id)?;
            edit_draft(api, storage, redirect_after, |wizard| {
                wizard.select_institution(institution)
            })
        }
        Command::Service { id } => {
            let service = ServiceId::new(id)?;
            edit_draft(api, storage, redirect_after, |wizard| {
                wizard.select_service(service)
            })
        }
        Command::Date { date } => edit_draft(api, storage, redirect_after, |wizard| {
            wizard.select_date(date).map(|_| ())
        }),
        Command::Time { time } => edit_draft(api, storage, redirect_after, |wizard| {
            let date = wizard.form().appointment.date.ok_or_else(|| {
                ServiceError::Validation("Selectati mai intai data programarii.".to_string())
            })?;
            wizard.select_time(date.and_time(time))
        }),
        Command::Contact { name, email, phone } => {
            edit_draft(api, storage, redirect_after, |wizard| {
                wizard.update_contact(UserGroup { name, email, phone })
            })
        }
        Command::Step { step } => edit_draft(api, storage, redirect_after, |wizard| {
            wizard.set_step(step)
        }),
        Command::Submit => submit_draft(BookingWizard::new(api, storage, redirect_after)),
        Command::Reset => {
            BookingWizard::new(api, storage, redirect_after).reset()?;
            Ok("Draft discarded.".to_string())
        }
        Command::Appointments { email } => {
            let data = search_customer_appointments(&api, &email)?;
            if !data.searched {
                return Ok(String::new());
            }
            if data.appointments.is_empty() {
                return Ok("No appointments found.".to_string());
            }
            Ok(data
                .appointments
                .iter()
                .map(|a| {
                    format!(
                        "#{}\t{}\t{}\t{}\t{}",
                        a.id,
                        a.appointment_time.format("%d.%m.%Y %H:%M"),
                        a.status,
                        a.service_type.as_deref().unwrap_or("-"),
                        a.institution_name.as_deref().unwrap_or("-"),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Login { email, password } => {
            let outcome =
                StoredSession::new(storage).login(&api, LoginForm { email, password })?;
            let name = outcome.user.name.as_deref().unwrap_or("user");
            Ok(format!("Signed in as {name}. Next: {}", outcome.landing))
        }
        Command::Logout => {
            StoredSession::new(storage).logout()?;
            Ok("Signed out.".to_string())
        }
        Command::Dashboard => {
            let data = load_dashboard(&api, Local::now().naive_local())?;
            let stats = &data.stats;
            let mut lines = vec![
                format!("Total: {}", stats.total),
                format!(
                    "Pending: {}  Confirmed: {}  Completed: {}  Cancelled: {}",
                    stats.pending, stats.confirmed, stats.completed, stats.cancelled
                ),
                format!("Today onwards: {}  Last 7 days onwards: {}", stats.today, stats.week),
                format!("By weekday (Mon-Sun): {:?}", data.by_weekday),
            ];
            for (code, count) in &data.by_service_type {
                lines.push(format!("{}: {count}", service_type_label(code)));
            }
            Ok(lines.join("\n"))
        }
        Command::Notifications { status } => {
            let session = StoredSession::new(storage);
            let data = list_notifications(&api, &session, status)?;
            Ok(data
                .notifications
                .iter()
                .map(|n| {
                    format!(
                        "#{}\t{}\t{}\t{}",
                        n.id,
                        n.status.map_or("-", NotificationStatus::as_str),
                        n.channel(),
                        n.message.as_deref().unwrap_or("-"),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

/// Resumes the stored draft, applies `change` and shows the result.
fn edit_draft<A, S, F>(
    api: A,
    storage: S,
    redirect_after: Duration,
    change: F,
) -> ServiceResult<String>
where
    A: DirectoryApi + AppointmentApi,
    S: LocalStorage,
    F: FnOnce(&mut BookingWizard<A, S>) -> ServiceResult<()>,
{
    let mut wizard = BookingWizard::new(api, storage, redirect_after);
    wizard.load_counties()?;
    wizard.resume()?;
    change(&mut wizard)?;
    Ok(describe_draft(wizard.state()).join("\n"))
}

fn submit_draft<A, S>(mut wizard: BookingWizard<A, S>) -> ServiceResult<String>
where
    A: DirectoryApi + AppointmentApi,
    S: LocalStorage,
{
    wizard.load_counties()?;
    if wizard.resume()?.is_none() {
        return Ok("No saved draft.".to_string());
    }

    let state = wizard.state();
    let service_name = state.selected_service().map(|s| s.name.clone());
    let institution_name = state.selected_institution().map(|i| i.name.clone());
    let start = state
        .form
        .appointment
        .date
        .zip(state.form.appointment.time)
        .map(|(date, time)| combine_date_and_time(date, time));

    match wizard.submit() {
        SubmissionOutcome::Succeeded(confirmation) => {
            let mut lines = vec![confirmation.message()];
            if let Some(url) = qr_code_url(confirmation.appointment.id) {
                lines.push(format!("QR: {url}"));
            }
            if let (Some(service), Some(institution), Some(start)) =
                (service_name, institution_name, start)
            {
                if let Some(url) = calendar_link(&service, &institution, start) {
                    lines.push(format!("Calendar: {url}"));
                }
            }
            lines.push(format!("Next: {}", confirmation.redirect_to));
            Ok(lines.join("\n"))
        }
        SubmissionOutcome::Rejected { message } => Err(ServiceError::Validation(message)),
        SubmissionOutcome::Failed { message, .. } => Err(ServiceError::Rejected(message)),
        SubmissionOutcome::Ignored => Ok("A submission is already in progress.".to_string()),
    }
}

fn describe_draft(state: &WizardState) -> Vec<String> {
    let form = &state.form;
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    vec![
        format!("Step: {}", state.current_step),
        format!(
            "County: {}",
            or_dash(
                state
                    .selected_county()
                    .map(|c| c.name.clone())
                    .or_else(|| form.institution.county.map(|id| id.to_string()))
            )
        ),
        format!(
            "Institution: {}",
            or_dash(state.selected_institution().map(|i| i.name.clone()))
        ),
        format!(
            "Service: {}",
            or_dash(state.selected_service().map(|s| s.name.clone()))
        ),
        format!(
            "Date: {}",
            or_dash(form.appointment.date.map(|d| d.format("%d.%m.%Y").to_string()))
        ),
        format!(
            "Time: {}",
            or_dash(form.appointment.time.map(|t| t.format("%H:%M").to_string()))
        ),
        format!(
            "Contact: {} / {} / {}",
            form.user.name, form.user.email, form.user.phone
        ),
        format!("Available times: {}", state.time_options.len()),
    ]
}
