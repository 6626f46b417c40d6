use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{CountyId, InstitutionId, ServiceId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct County {
    pub id: CountyId,
    pub name: String,
}

/// Institution listed for a county. Snapshots are never cached across sessions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub institution_type: String,
    #[serde(default)]
    pub county: Option<String>,
}

/// A public service offered by an institution type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicService {
    pub id: ServiceId,
    pub name: String,
}

/// Metadata and availability for one institution type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionDetails {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub max_appointments_per_day: u32,
    #[serde(default)]
    pub available_services: Vec<PublicService>,
    /// Flat list of bookable timestamps, not slot ranges.
    #[serde(default)]
    pub availability: Vec<NaiveDateTime>,
}

impl InstitutionDetails {
    /// Looks up an offered service by identifier.
    pub fn service(&self, id: ServiceId) -> Option<&PublicService> {
        self.available_services.iter().find(|s| s.id == id)
    }
}

/// Slots returned by the per-date availability endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub institution_id: InstitutionId,
    #[serde(default)]
    pub available_slots: Vec<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn institution_details_parse_backend_payload() {
        let payload = r#"{
            "id": 3,
            "name": "Primaria Cluj",
            "openingTime": "08:00:00",
            "closingTime": "16:30:00",
            "maxAppointmentsPerDay": 40,
            "availableServices": [{"id": 1, "name": "Eliberare carte de identitate"}],
            "availability": ["2024-05-01T09:00:00", "2024-05-01T09:30:00"]
        }"#;

        let details: InstitutionDetails = serde_json::from_str(payload).unwrap();

        assert_eq!(details.closing_time, NaiveTime::from_hms_opt(16, 30, 0).unwrap());
        assert_eq!(details.availability.len(), 2);
        assert_eq!(
            details.service(ServiceId::new(1).unwrap()).map(|s| s.name.as_str()),
            Some("Eliberare carte de identitate")
        );
        assert!(details.service(ServiceId::new(2).unwrap()).is_none());
    }
}
