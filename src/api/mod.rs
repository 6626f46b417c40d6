//! Remote booking API.
//!
//! Endpoints are grouped into small traits so that services only ask for what
//! they use and tests can fake a single concern.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::appointment::{AppointmentCreated, AppointmentSummary, NewAppointment};
use crate::domain::institution::{Availability, County, Institution, InstitutionDetails};
use crate::domain::notification::{Notification, NotificationStatus};
use crate::domain::session::{Credentials, SessionUser, UserRole};
use crate::domain::types::{CountyId, InstitutionId};

#[cfg(feature = "client")]
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[cfg(feature = "client")]
pub use self::http::HttpBookingApi;

/// Header carrying the role of the signed-in user on admin requests.
pub const ROLE_HEADER: &str = "X-User-Role";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an HTTP response (reported as status 0).
    #[error("network error: {0}")]
    Transport(String),

    #[error("server responded with status {status}")]
    Status { status: u16, body: String },

    #[error("unexpected response payload: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of the failure, `0` when no response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(_) => Some(0),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Decode(_) => None,
        }
    }

    /// Response body returned with an error status.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub trait DirectoryApi {
    fn list_counties(&self) -> ApiResult<Vec<County>>;
    fn list_institutions(&self, county: CountyId) -> ApiResult<Vec<Institution>>;
    fn get_institution_details(&self, institution_type: &str) -> ApiResult<InstitutionDetails>;
    fn get_availability(
        &self,
        institution: InstitutionId,
        start_date: NaiveDate,
    ) -> ApiResult<Availability>;
}

pub trait AppointmentApi {
    fn create_appointment(&self, appointment: &NewAppointment) -> ApiResult<AppointmentCreated>;
    fn list_customer_appointments(&self, email: &str) -> ApiResult<Vec<AppointmentSummary>>;
    fn list_all_appointments(&self) -> ApiResult<Vec<AppointmentSummary>>;
}

impl<T: DirectoryApi + ?Sized> DirectoryApi for &T {
    fn list_counties(&self) -> ApiResult<Vec<County>> {
        (**self).list_counties()
    }

    fn list_institutions(&self, county: CountyId) -> ApiResult<Vec<Institution>> {
        (**self).list_institutions(county)
    }

    fn get_institution_details(&self, institution_type: &str) -> ApiResult<InstitutionDetails> {
        (**self).get_institution_details(institution_type)
    }

    fn get_availability(
        &self,
        institution: InstitutionId,
        start_date: NaiveDate,
    ) -> ApiResult<Availability> {
        (**self).get_availability(institution, start_date)
    }
}

impl<T: AppointmentApi + ?Sized> AppointmentApi for &T {
    fn create_appointment(&self, appointment: &NewAppointment) -> ApiResult<AppointmentCreated> {
        (**self).create_appointment(appointment)
    }

    fn list_customer_appointments(&self, email: &str) -> ApiResult<Vec<AppointmentSummary>> {
        (**self).list_customer_appointments(email)
    }

    fn list_all_appointments(&self) -> ApiResult<Vec<AppointmentSummary>> {
        (**self).list_all_appointments()
    }
}

pub trait AuthApi {
    fn login(&self, credentials: &Credentials) -> ApiResult<SessionUser>;
}

pub trait NotificationApi {
    fn list_notifications(
        &self,
        role: &UserRole,
        status: Option<NotificationStatus>,
    ) -> ApiResult<Vec<Notification>>;
}

impl<T: AuthApi + ?Sized> AuthApi for &T {
    fn login(&self, credentials: &Credentials) -> ApiResult<SessionUser> {
        (**self).login(credentials)
    }
}

impl<T: NotificationApi + ?Sized> NotificationApi for &T {
    fn list_notifications(
        &self,
        role: &UserRole,
        status: Option<NotificationStatus>,
    ) -> ApiResult<Vec<Notification>> {
        (**self).list_notifications(role, status)
    }
}
