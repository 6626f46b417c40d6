//! Appointment submission: validation, the in-flight guard and mapping of
//! server failures onto user-facing messages.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;

use crate::api::{ApiError, AppointmentApi};
use crate::domain::appointment::{AppointmentCreated, NewAppointment, PriorityLevel, ServiceType};
use crate::domain::institution::{Institution, InstitutionDetails};
use crate::domain::types::AppointmentId;
use crate::forms::appointment::AppointmentPayload;
use crate::services::{ServiceError, ServiceResult};

/// View shown after a successful booking.
pub const APPOINTMENTS_VIEW: &str = "/user-appointments";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    SlotTaken,
    InvalidTime,
    Connectivity,
    ServerError,
    Unknown,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::SlotTaken => {
                "Intervalul orar selectat este deja ocupat. Va rugam alegeti alta ora."
            }
            FailureKind::InvalidTime => {
                "Ora selectata nu este in programul de lucru al institutiei."
            }
            FailureKind::Connectivity => {
                "Nu s-a putut contacta serverul. Verificati conexiunea la internet."
            }
            FailureKind::ServerError => "Eroare de server. Va rugam incercati mai tarziu.",
            FailureKind::Unknown => "Eroare la crearea programarii. Va rugam incercati din nou.",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "SLOT_OVERLAP" | "APPOINTMENT_OVERLAP" => Some(FailureKind::SlotTaken),
            "INVALID_TIME" | "OUTSIDE_BUSINESS_HOURS" => Some(FailureKind::InvalidTime),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a failed `POST /appointment` onto a [`FailureKind`].
pub fn classify_failure(err: &ApiError) -> FailureKind {
    if err.status() == Some(0) {
        return FailureKind::Connectivity;
    }

    let raw = err.body().unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(raw).unwrap_or_default();

    if let Some(kind) = body.code.as_deref().and_then(FailureKind::from_code) {
        return kind;
    }

    // Servers that predate error codes only describe the problem in text.
    // Matching on words is unreliable: any message mentioning "time" lands here.
    let texts: Vec<String> = [body.error.as_deref(), body.message.as_deref(), Some(raw)]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .collect();
    let mentions = |word: &str| texts.iter().any(|text| text.contains(word));
    if mentions("overlap") {
        return FailureKind::SlotTaken;
    }
    if mentions("time") {
        return FailureKind::InvalidTime;
    }

    if err.status() == Some(500) {
        return FailureKind::ServerError;
    }
    FailureKind::Unknown
}

/// Builds the request body for a validated form.
///
/// Fails when the institution is not among the fetched ones, when the service
/// is not offered, or when the service name has no backend mapping.
pub fn build_appointment(
    payload: AppointmentPayload,
    institutions: &[Institution],
    details: Option<&InstitutionDetails>,
) -> ServiceResult<NewAppointment> {
    let institution = institutions
        .iter()
        .find(|i| i.id == payload.institution)
        .ok_or_else(|| {
            ServiceError::Validation("Institutia selectata nu mai este disponibila.".to_string())
        })?;

    let service = details
        .and_then(|d| d.service(payload.service))
        .ok_or_else(|| {
            ServiceError::Validation(
                "Serviciul selectat nu este oferit de aceasta institutie.".to_string(),
            )
        })?;

    let service_type = ServiceType::from_display_name(&service.name).ok_or_else(|| {
        log::warn!("No service type mapping for service '{}'", service.name);
        ServiceError::Validation(format!(
            "Serviciul \"{}\" nu poate fi programat online.",
            service.name
        ))
    })?;

    Ok(NewAppointment {
        institution_id: institution.id,
        institution_type: institution.institution_type.clone(),
        appointment_time: payload.appointment_time,
        customer_name: payload.name,
        customer_email: payload.email,
        customer_phone: payload.phone,
        service_type,
        priority_level: PriorityLevel::default(),
        notes: service.name.clone(),
        document_required: String::new(),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded(AppointmentId),
    Failed(FailureKind),
}

impl SubmissionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub appointment: AppointmentCreated,
    pub redirect_to: &'static str,
    pub redirect_after: Duration,
}

impl Confirmation {
    pub fn message(&self) -> String {
        format!("Programare creata cu succes! ID: {}", self.appointment.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Another submission was already in flight; nothing was sent.
    Ignored,
    /// Local validation failed; nothing was sent.
    Rejected { message: String },
    Succeeded(Confirmation),
    Failed { kind: FailureKind, message: String },
}

/// Runs submissions one at a time.
///
/// Shared by reference across threads; an attempt made while another is
/// validating or submitting returns [`SubmissionOutcome::Ignored`].
#[derive(Debug)]
pub struct Submitter {
    state: Mutex<SubmissionState>,
    redirect_after: Duration,
}

impl Submitter {
    pub fn new(redirect_after: Duration) -> Self {
        Self {
            state: Mutex::new(SubmissionState::Idle),
            redirect_after,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().clone()
    }

    /// Validates through `prepare`, then posts the appointment.
    pub fn submit<A, F>(&self, api: &A, prepare: F) -> SubmissionOutcome
    where
        A: AppointmentApi + ?Sized,
        F: FnOnce() -> ServiceResult<NewAppointment>,
    {
        {
            let mut state = self.lock();
            if state.is_in_flight() {
                log::info!("Submission ignored: another one is in flight");
                return SubmissionOutcome::Ignored;
            }
            *state = SubmissionState::Validating;
        }

        let appointment = match prepare() {
            Ok(appointment) => appointment,
            Err(e) => {
                log::warn!("Appointment rejected before submission: {e}");
                self.set(SubmissionState::Idle);
                return SubmissionOutcome::Rejected {
                    message: e.user_message(),
                };
            }
        };

        self.set(SubmissionState::Submitting);
        match api.create_appointment(&appointment) {
            Ok(created) => {
                log::info!("Appointment {} created", created.id);
                self.set(SubmissionState::Succeeded(created.id));
                SubmissionOutcome::Succeeded(Confirmation {
                    appointment: created,
                    redirect_to: APPOINTMENTS_VIEW,
                    redirect_after: self.redirect_after,
                })
            }
            Err(e) => {
                log::error!("Error saving appointment: {e}");
                let kind = classify_failure(&e);
                self.set(SubmissionState::Failed(kind));
                SubmissionOutcome::Failed {
                    kind,
                    message: kind.message().to_string(),
                }
            }
        }
    }

    fn set(&self, state: SubmissionState) {
        *self.lock() = state;
    }

    fn lock(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
