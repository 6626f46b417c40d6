//! DTOs used by the dashboard.

use crate::domain::appointment::AppointmentSummary;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Appointments from the start of today onwards.
    pub today: usize,
    /// Appointments from seven days ago onwards.
    pub week: usize,
}

/// Data required to render the dashboard.
#[derive(Debug, Default, PartialEq)]
pub struct DashboardData {
    pub stats: DashboardStats,
    /// Five latest appointments, newest first.
    pub recent: Vec<AppointmentSummary>,
    /// Appointments per weekday, Monday first.
    pub by_weekday: [usize; 7],
    /// Appointments per service type, sorted by type.
    pub by_service_type: Vec<(String, usize)>,
}
