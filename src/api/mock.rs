//! Mock API implementations for isolating services in tests.

use chrono::NaiveDate;
use mockall::mock;

use crate::api::{ApiResult, AppointmentApi, AuthApi, DirectoryApi, NotificationApi};
use crate::domain::appointment::{AppointmentCreated, AppointmentSummary, NewAppointment};
use crate::domain::institution::{Availability, County, Institution, InstitutionDetails};
use crate::domain::notification::{Notification, NotificationStatus};
use crate::domain::session::{Credentials, SessionUser, UserRole};
use crate::domain::types::{CountyId, InstitutionId};

mock! {
    pub BookingApi {}

    impl DirectoryApi for BookingApi {
        fn list_counties(&self) -> ApiResult<Vec<County>>;
        fn list_institutions(&self, county: CountyId) -> ApiResult<Vec<Institution>>;
        fn get_institution_details(&self, institution_type: &str) -> ApiResult<InstitutionDetails>;
        fn get_availability(
            &self,
            institution: InstitutionId,
            start_date: NaiveDate,
        ) -> ApiResult<Availability>;
    }

    impl AppointmentApi for BookingApi {
        fn create_appointment(&self, appointment: &NewAppointment) -> ApiResult<AppointmentCreated>;
        fn list_customer_appointments(&self, email: &str) -> ApiResult<Vec<AppointmentSummary>>;
        fn list_all_appointments(&self) -> ApiResult<Vec<AppointmentSummary>>;
    }

    impl AuthApi for BookingApi {
        fn login(&self, credentials: &Credentials) -> ApiResult<SessionUser>;
    }

    impl NotificationApi for BookingApi {
        fn list_notifications(
            &self,
            role: &UserRole,
            status: Option<NotificationStatus>,
        ) -> ApiResult<Vec<Notification>>;
    }
}
