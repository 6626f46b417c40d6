//! Links shown on the booking confirmation.

use chrono::{Duration, NaiveDateTime};
use reqwest::Url;

use crate::domain::types::AppointmentId;

const QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
const CALENDAR_ENDPOINT: &str = "https://calendar.google.com/calendar/render";
const CALENDAR_FORMAT: &str = "%Y%m%dT%H%M%S";
const SLOT_MINUTES: i64 = 30;

/// Image URL of a QR code identifying the appointment.
pub fn qr_code_url(id: AppointmentId) -> Option<Url> {
    let data = format!("SASPS-APPOINTMENT:{id}");
    Url::parse_with_params(QR_ENDPOINT, [("size", "200x200"), ("data", data.as_str())]).ok()
}

/// Google Calendar template link for a thirty minute slot.
pub fn calendar_link(
    service_name: &str,
    institution_name: &str,
    start: NaiveDateTime,
) -> Option<Url> {
    let end = start + Duration::minutes(SLOT_MINUTES);
    let dates = format!(
        "{}/{}",
        start.format(CALENDAR_FORMAT),
        end.format(CALENDAR_FORMAT)
    );
    let title = format!("Programare: {service_name}");
    let details = format!("Programare la {institution_name} pentru {service_name}");

    Url::parse_with_params(
        CALENDAR_ENDPOINT,
        [
            ("action", "TEMPLATE"),
            ("text", title.as_str()),
            ("dates", dates.as_str()),
            ("details", details.as_str()),
            ("location", institution_name),
        ],
    )
    .ok()
}
