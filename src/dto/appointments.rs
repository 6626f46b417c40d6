//! DTOs used by the customer appointments view.

use crate::domain::appointment::AppointmentSummary;

/// Result of looking up appointments by customer email.
#[derive(Debug, Default, PartialEq)]
pub struct CustomerAppointmentsData {
    /// `false` when no lookup was made because the email was blank.
    pub searched: bool,
    pub appointments: Vec<AppointmentSummary>,
}
