use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::{
    ApiError, ApiResult, AppointmentApi, AuthApi, DirectoryApi, NotificationApi, ROLE_HEADER,
};
use crate::domain::appointment::{AppointmentCreated, AppointmentSummary, NewAppointment};
use crate::domain::institution::{Availability, County, Institution, InstitutionDetails};
use crate::domain::notification::{Notification, NotificationStatus};
use crate::domain::session::{Credentials, SessionUser, UserRole};
use crate::domain::types::{CountyId, InstitutionId};

/// Blocking HTTP client for the booking API.
#[derive(Clone, Debug)]
pub struct HttpBookingApi {
    base_url: Url,
    client: Client,
}

impl HttpBookingApi {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// `timeout` of `None` lets requests wait indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid API url {base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("cannot-be-a-base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().map_err(|e| {
            log::error!("Request to booking API failed: {e}");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::warn!("Booking API responded with {status}: {body}");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl DirectoryApi for HttpBookingApi {
    fn list_counties(&self) -> ApiResult<Vec<County>> {
        let url = self.endpoint(&["appointment", "counties"])?;
        self.send(self.client.get(url))
    }

    fn list_institutions(&self, county: CountyId) -> ApiResult<Vec<Institution>> {
        let county = county.to_string();
        let url = self.endpoint(&["appointment", "institutions", &county])?;
        self.send(self.client.get(url))
    }

    fn get_institution_details(&self, institution_type: &str) -> ApiResult<InstitutionDetails> {
        let url = self.endpoint(&["institution", institution_type])?;
        self.send(self.client.get(url))
    }

    fn get_availability(
        &self,
        institution: InstitutionId,
        start_date: NaiveDate,
    ) -> ApiResult<Availability> {
        let url = self.endpoint(&["appointment", "availability"])?;
        let query = [
            ("institutionId", institution.to_string()),
            ("startDate", start_date.format("%d%m%Y").to_string()),
        ];
        self.send(self.client.get(url).query(&query))
    }
}

impl AppointmentApi for HttpBookingApi {
    fn create_appointment(&self, appointment: &NewAppointment) -> ApiResult<AppointmentCreated> {
        let url = self.endpoint(&["appointment"])?;
        self.send(self.client.post(url).json(appointment))
    }

    fn list_customer_appointments(&self, email: &str) -> ApiResult<Vec<AppointmentSummary>> {
        let url = self.endpoint(&["appointment", "customer", email])?;
        self.send(self.client.get(url))
    }

    fn list_all_appointments(&self) -> ApiResult<Vec<AppointmentSummary>> {
        let url = self.endpoint(&["appointment", "all"])?;
        self.send(self.client.get(url))
    }
}

impl AuthApi for HttpBookingApi {
    fn login(&self, credentials: &Credentials) -> ApiResult<SessionUser> {
        let url = self.endpoint(&["auth", "login"])?;
        self.send(self.client.post(url).json(credentials))
    }
}

impl NotificationApi for HttpBookingApi {
    fn list_notifications(
        &self,
        role: &UserRole,
        status: Option<NotificationStatus>,
    ) -> ApiResult<Vec<Notification>> {
        let url = match status {
            Some(status) => self.endpoint(&["notifications", "status", status.as_str()])?,
            None => self.endpoint(&["notifications", "all"])?,
        };
        self.send(self.client.get(url).header(ROLE_HEADER, role.as_str()))
    }
}
