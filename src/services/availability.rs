//! Time picker options for a selected date.

use chrono::{NaiveDate, NaiveDateTime};

use crate::api::DirectoryApi;
use crate::domain::types::InstitutionId;
use crate::services::ServiceResult;

/// Keeps the slots that fall on `date`, in their original order.
pub fn filter_same_day(slots: &[NaiveDateTime], date: NaiveDate) -> Vec<NaiveDateTime> {
    slots
        .iter()
        .filter(|slot| slot.date() == date)
        .copied()
        .collect()
}

/// Polls the availability endpoint for `date` and returns the slots offered
/// on that day.
pub fn fetch_time_options<A>(
    api: &A,
    institution: InstitutionId,
    date: NaiveDate,
) -> ServiceResult<Vec<NaiveDateTime>>
where
    A: DirectoryApi + ?Sized,
{
    let availability = api.get_availability(institution, date).map_err(|e| {
        log::error!("Failed to fetch availability for institution {institution} on {date}: {e}");
        e
    })?;

    if availability.institution_id != institution {
        log::warn!(
            "Availability answered for institution {} instead of {institution}",
            availability.institution_id
        );
    }

    Ok(filter_same_day(&availability.available_slots, date))
}
