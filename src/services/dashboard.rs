//! Appointment statistics for the dashboard.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};

use crate::api::AppointmentApi;
use crate::domain::appointment::{AppointmentStatus, AppointmentSummary};
use crate::dto::dashboard::{DashboardData, DashboardStats};
use crate::services::ServiceResult;

const RECENT_LIMIT: usize = 5;
/// Bucket for appointments without a service type.
pub const OTHER_SERVICE_TYPE: &str = "ALTELE";

/// Fetches every appointment and summarises it relative to `now`.
pub fn load_dashboard<A>(api: &A, now: NaiveDateTime) -> ServiceResult<DashboardData>
where
    A: AppointmentApi + ?Sized,
{
    let appointments = api.list_all_appointments().map_err(|e| {
        log::error!("Failed to fetch appointments for dashboard: {e}");
        e
    })?;

    Ok(summarize(appointments, now))
}

pub fn summarize(mut appointments: Vec<AppointmentSummary>, now: NaiveDateTime) -> DashboardData {
    let today = now.date().and_time(NaiveTime::MIN);
    let week_ago = today - Duration::days(7);

    let mut stats = DashboardStats {
        total: appointments.len(),
        ..DashboardStats::default()
    };
    let mut by_weekday = [0usize; 7];
    let mut by_service_type: BTreeMap<String, usize> = BTreeMap::new();

    for appointment in &appointments {
        match appointment.status {
            AppointmentStatus::Pending => stats.pending += 1,
            AppointmentStatus::Confirmed => stats.confirmed += 1,
            AppointmentStatus::Completed => stats.completed += 1,
            AppointmentStatus::Cancelled => stats.cancelled += 1,
            AppointmentStatus::Other(_) => {}
        }
        if appointment.appointment_time >= today {
            stats.today += 1;
        }
        if appointment.appointment_time >= week_ago {
            stats.week += 1;
        }

        let weekday = appointment.appointment_time.weekday().num_days_from_monday() as usize;
        by_weekday[weekday] += 1;

        let service_type = appointment
            .service_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(OTHER_SERVICE_TYPE);
        *by_service_type.entry(service_type.to_string()).or_default() += 1;
    }

    appointments.sort_by(|a, b| b.appointment_time.cmp(&a.appointment_time));
    appointments.truncate(RECENT_LIMIT);

    DashboardData {
        stats,
        recent: appointments,
        by_weekday,
        by_service_type: by_service_type.into_iter().collect(),
    }
}

/// Short label for a service type code, falling back to the code itself.
pub fn service_type_label(code: &str) -> &str {
    match code {
        "ELIBERARE_CI" => "Carte de Identitate",
        "CERTIFICAT_NASTERE" => "Certificat Nastere",
        "DECLARATIE_FISCALA" => "Declaratie Fiscala",
        "PRESCHIMBARE_PERMIS" => "Permis Conducere",
        "INMATRICULARE_VEHICUL" => "Inmatriculare",
        other => other,
    }
}
