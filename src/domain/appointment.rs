use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AppointmentId, CustomerEmail, CustomerName, InstitutionId, PhoneNumber};

/// Backend enum for the service being booked.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    EliberareCi,
    CertificatNastere,
    DeclaratieFiscala,
    PreschimbarePermis,
    InmatriculareVehicul,
}

/// Display names as published by institutions, paired with the backend enum.
const SERVICE_TYPE_TABLE: &[(&str, ServiceType)] = &[
    ("Eliberare carte de identitate", ServiceType::EliberareCi),
    ("Eliberare certificate", ServiceType::CertificatNastere),
    ("Taxe si impozite locale", ServiceType::DeclaratieFiscala),
    ("Preschimbare permis de conducere", ServiceType::PreschimbarePermis),
    ("Inmatriculare vehicul", ServiceType::InmatriculareVehicul),
];

impl ServiceType {
    /// Maps a service display name onto the backend enum.
    ///
    /// Returns `None` when the name has no known mapping; callers must treat
    /// that as a blocking validation error.
    pub fn from_display_name(name: &str) -> Option<Self> {
        let name = name.trim();
        SERVICE_TYPE_TABLE
            .iter()
            .find(|(display, _)| *display == name)
            .map(|(_, service_type)| *service_type)
    }

    /// Wire representation used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::EliberareCi => "ELIBERARE_CI",
            ServiceType::CertificatNastere => "CERTIFICAT_NASTERE",
            ServiceType::DeclaratieFiscala => "DECLARATIE_FISCALA",
            ServiceType::PreschimbarePermis => "PRESCHIMBARE_PERMIS",
            ServiceType::InmatriculareVehicul => "INMATRICULARE_VEHICUL",
        }
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Appointment payload submitted to `POST /appointment`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub institution_id: InstitutionId,
    pub institution_type: String,
    pub appointment_time: NaiveDateTime,
    pub customer_name: CustomerName,
    pub customer_email: CustomerEmail,
    pub customer_phone: PhoneNumber,
    pub service_type: ServiceType,
    pub priority_level: PriorityLevel,
    pub notes: String,
    pub document_required: String,
}

/// Server acknowledgement of a created appointment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "CreatedPayload")]
pub struct AppointmentCreated {
    pub id: AppointmentId,
    pub message: Option<String>,
}

/// The backend answers either with a bare id or with `{ id, message }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedPayload {
    Bare(AppointmentId),
    Detailed {
        id: AppointmentId,
        #[serde(default)]
        message: Option<String>,
    },
}

impl From<CreatedPayload> for AppointmentCreated {
    fn from(payload: CreatedPayload) -> Self {
        match payload {
            CreatedPayload::Bare(id) => Self { id, message: None },
            CreatedPayload::Detailed { id, message } => Self { id, message },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Other(String),
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PENDING" => AppointmentStatus::Pending,
            "CONFIRMED" => AppointmentStatus::Confirmed,
            "COMPLETED" => AppointmentStatus::Completed,
            "CANCELLED" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Other(s.to_string()),
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(s: String) -> Self {
        AppointmentStatus::from(s.as_str())
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.to_string()
    }
}

/// Appointment row as listed for customers and on the dashboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub id: AppointmentId,
    #[serde(default)]
    pub title: Option<String>,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
    /// Kept as raw text: listings may carry types the booking form never sends.
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub institution_name: Option<String>,
}
