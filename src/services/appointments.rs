//! Customer appointment lookup.

use crate::api::AppointmentApi;
use crate::dto::appointments::CustomerAppointmentsData;
use crate::services::ServiceResult;

/// Lists the appointments booked under `email`.
///
/// A blank email performs no request and reports `searched = false`. Otherwise
/// the trimmed email is sent as typed.
pub fn search_customer_appointments<A>(
    api: &A,
    email: &str,
) -> ServiceResult<CustomerAppointmentsData>
where
    A: AppointmentApi + ?Sized,
{
    let email = email.trim();
    if email.is_empty() {
        return Ok(CustomerAppointmentsData::default());
    }

    let appointments = api.list_customer_appointments(email).map_err(|e| {
        log::error!("Error fetching appointments for {email}: {e}");
        e
    })?;

    Ok(CustomerAppointmentsData {
        searched: true,
        appointments,
    })
}
