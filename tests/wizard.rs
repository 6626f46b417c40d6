//! Booking flow against a scripted API and a real SQLite store.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use civic_booking::api::{ApiError, ApiResult, AppointmentApi, DirectoryApi};
use civic_booking::domain::appointment::{
    AppointmentCreated, AppointmentSummary, NewAppointment, ServiceType,
};
use civic_booking::domain::institution::{
    Availability, County, Institution, InstitutionDetails, PublicService,
};
use civic_booking::domain::types::{AppointmentId, CountyId, InstitutionId, ServiceId};
use civic_booking::forms::appointment::UserGroup;
use civic_booking::services::submission::{FailureKind, SubmissionOutcome};
use civic_booking::services::wizard::BookingWizard;
use civic_booking::storage::{DRAFT_KEY, LocalStorage};

mod common;

fn slot(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Directory with one county, two institutions and a scripted POST answer.
struct FakeApi {
    post_result: ApiResult<AppointmentCreated>,
    posted: Mutex<Vec<NewAppointment>>,
}

impl FakeApi {
    fn answering(post_result: ApiResult<AppointmentCreated>) -> Self {
        Self {
            post_result,
            posted: Mutex::new(Vec::new()),
        }
    }
}

impl DirectoryApi for FakeApi {
    fn list_counties(&self) -> ApiResult<Vec<County>> {
        Ok(vec![County {
            id: CountyId::new(12).unwrap(),
            name: "Cluj".to_string(),
        }])
    }

    fn list_institutions(&self, county: CountyId) -> ApiResult<Vec<Institution>> {
        if county.get() != 12 {
            return Ok(Vec::new());
        }
        Ok(vec![
            Institution {
                id: InstitutionId::new(3).unwrap(),
                name: "Primaria Cluj".to_string(),
                institution_type: "PRIMARIE".to_string(),
                county: Some("Cluj".to_string()),
            },
            Institution {
                id: InstitutionId::new(4).unwrap(),
                name: "DRPCIV Cluj".to_string(),
                institution_type: "DRPCIV".to_string(),
                county: Some("Cluj".to_string()),
            },
        ])
    }

    fn get_institution_details(&self, institution_type: &str) -> ApiResult<InstitutionDetails> {
        let service = match institution_type {
            "PRIMARIE" => "Eliberare carte de identitate",
            _ => "Inmatriculare vehicul",
        };
        Ok(InstitutionDetails {
            id: 1,
            name: None,
            opening_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            max_appointments_per_day: 30,
            available_services: vec![PublicService {
                id: ServiceId::new(1).unwrap(),
                name: service.to_string(),
            }],
            availability: Vec::new(),
        })
    }

    fn get_availability(
        &self,
        institution: InstitutionId,
        _start_date: NaiveDate,
    ) -> ApiResult<Availability> {
        Ok(Availability {
            institution_id: institution,
            available_slots: vec![slot(1, 9), slot(1, 10), slot(2, 9)],
        })
    }
}

impl AppointmentApi for FakeApi {
    fn create_appointment(&self, appointment: &NewAppointment) -> ApiResult<AppointmentCreated> {
        self.posted.lock().unwrap().push(appointment.clone());
        self.post_result.clone()
    }

    fn list_customer_appointments(&self, _email: &str) -> ApiResult<Vec<AppointmentSummary>> {
        Ok(Vec::new())
    }

    fn list_all_appointments(&self) -> ApiResult<Vec<AppointmentSummary>> {
        Ok(Vec::new())
    }
}

fn contact() -> UserGroup {
    UserGroup {
        name: "Ion Popescu".to_string(),
        email: "ion@example.com".to_string(),
        phone: "0712345678".to_string(),
    }
}

fn fill<S: LocalStorage>(wizard: &mut BookingWizard<&FakeApi, S>, institution: i64) {
    wizard.load_counties().unwrap();
    wizard.select_county(CountyId::new(12).unwrap()).unwrap();
    wizard
        .select_institution(InstitutionId::new(institution).unwrap())
        .unwrap();
    wizard.select_service(ServiceId::new(1).unwrap()).unwrap();
    let options = wizard
        .select_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        .unwrap()
        .to_vec();
    assert_eq!(options, vec![slot(1, 9), slot(1, 10)]);
    wizard.select_time(slot(1, 10)).unwrap();
    wizard.update_contact(contact()).unwrap();
    wizard.set_step(3).unwrap();
}

#[test]
fn test_draft_survives_restart_and_submits() {
    let test_db = common::TestDb::new("test_draft_survives_restart.db");
    let api = FakeApi::answering(Ok(AppointmentCreated {
        id: AppointmentId::new(77).unwrap(),
        message: None,
    }));

    {
        let mut wizard = BookingWizard::new(&api, test_db.storage(), Duration::ZERO);
        fill(&mut wizard, 4);
    }

    let mut wizard = BookingWizard::new(&api, test_db.storage(), Duration::ZERO);
    wizard.load_counties().unwrap();
    let report = wizard.resume().unwrap().unwrap();
    assert!(report.is_complete());
    assert_eq!(wizard.state().current_step, 3);
    assert_eq!(wizard.form().appointment.time, Some(slot(1, 10)));
    assert_eq!(wizard.state().selected_county().unwrap().name, "Cluj");

    let outcome = wizard.submit();

    assert!(matches!(outcome, SubmissionOutcome::Succeeded(_)));
    let posted = api.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].institution_type, "DRPCIV");
    assert_eq!(posted[0].service_type, ServiceType::InmatriculareVehicul);
    assert_eq!(test_db.storage().get_item(DRAFT_KEY).unwrap(), None);
}

#[test]
fn test_overlap_failure_keeps_draft() {
    let test_db = common::TestDb::new("test_overlap_failure_keeps_draft.db");
    let api = FakeApi::answering(Err(ApiError::Status {
        status: 400,
        body: "Appointment overlaps with an existing appointment.".to_string(),
    }));
    let mut wizard = BookingWizard::new(&api, test_db.storage(), Duration::ZERO);
    fill(&mut wizard, 3);

    let outcome = wizard.submit();

    assert_eq!(
        outcome,
        SubmissionOutcome::Failed {
            kind: FailureKind::SlotTaken,
            message: FailureKind::SlotTaken.message().to_string(),
        }
    );
    assert!(test_db.storage().get_item(DRAFT_KEY).unwrap().is_some());
}

#[test]
fn test_corrupt_draft_is_discarded() {
    let test_db = common::TestDb::new("test_corrupt_draft_is_discarded.db");
    let storage = test_db.storage();
    storage.set_item(DRAFT_KEY, "{\"formData\": 12").unwrap();
    let api = FakeApi::answering(Err(ApiError::Transport("unused".to_string())));

    let mut wizard = BookingWizard::new(&api, storage.clone(), Duration::ZERO);

    assert_eq!(wizard.resume().unwrap(), None);
    assert_eq!(storage.get_item(DRAFT_KEY).unwrap(), None);
    assert_eq!(wizard.state().current_step, 1);
}
