//! The multi-step booking wizard.
//!
//! [`BookingWizard`] owns the form, the remote lookups that feed its pickers
//! and the stored draft. Every change to the form is written through to
//! storage before any follow-up fetch is issued.

use std::mem;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::api::{AppointmentApi, DirectoryApi};
use crate::domain::institution::{County, Institution, InstitutionDetails, PublicService};
use crate::domain::types::{CountyId, InstitutionId, ServiceId};
use crate::forms::appointment::{AppointmentForm, AppointmentPayload, UserGroup};
use crate::services::availability::fetch_time_options;
use crate::services::draft::{clear_draft, load_draft, save_draft};
use crate::services::restore::{RestoreReport, restore_snapshot};
use crate::services::submission::{
    SubmissionOutcome, SubmissionState, Submitter, build_appointment,
};
use crate::services::{ServiceError, ServiceResult};
use crate::storage::LocalStorage;

pub const FIRST_STEP: u32 = 1;

/// Form values together with the remote data currently backing the pickers.
#[derive(Clone, Debug, PartialEq)]
pub struct WizardState {
    pub form: AppointmentForm,
    pub current_step: u32,
    pub counties: Vec<County>,
    pub institutions: Vec<Institution>,
    pub institution_details: Option<InstitutionDetails>,
    pub time_options: Vec<NaiveDateTime>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            form: AppointmentForm::default(),
            current_step: FIRST_STEP,
            counties: Vec::new(),
            institutions: Vec::new(),
            institution_details: None,
            time_options: Vec::new(),
        }
    }
}

impl WizardState {
    pub fn selected_county(&self) -> Option<&County> {
        let id = self.form.institution.county?;
        self.counties.iter().find(|c| c.id == id)
    }

    pub fn selected_institution(&self) -> Option<&Institution> {
        let id = self.form.institution.institution?;
        self.institutions.iter().find(|i| i.id == id)
    }

    pub fn selected_service(&self) -> Option<&PublicService> {
        let id = self.form.appointment.service?;
        self.institution_details.as_ref()?.service(id)
    }
}

pub struct BookingWizard<A, S> {
    api: A,
    storage: S,
    state: WizardState,
    submitter: Submitter,
}

impl<A, S> BookingWizard<A, S>
where
    A: DirectoryApi + AppointmentApi,
    S: LocalStorage,
{
    pub fn new(api: A, storage: S, redirect_after: Duration) -> Self {
        Self {
            api,
            storage,
            state: WizardState::default(),
            submitter: Submitter::new(redirect_after),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.state.form
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submitter.state()
    }

    pub fn load_counties(&mut self) -> ServiceResult<&[County]> {
        self.state.counties = self.api.list_counties().map_err(|e| {
            log::error!("Failed to fetch counties: {e}");
            e
        })?;
        Ok(&self.state.counties)
    }

    /// Restores the stored draft, if any.
    ///
    /// Returns `None` when there was nothing usable to restore; an unreadable
    /// draft is discarded on the way.
    pub fn resume(&mut self) -> ServiceResult<Option<RestoreReport>> {
        let Some(snapshot) = load_draft(&self.storage)? else {
            return Ok(None);
        };

        let counties = mem::take(&mut self.state.counties);
        let (state, report) = restore_snapshot(&self.api, snapshot, counties);
        self.state = state;

        log::info!(
            "Restored draft through steps {:?} (stopped at {:?})",
            report.completed,
            report.stopped_at
        );
        Ok(Some(report))
    }

    /// Selects a county, clears the institution and fetches the county's
    /// institutions.
    pub fn select_county(&mut self, county: CountyId) -> ServiceResult<&[Institution]> {
        self.state.form.institution.county = Some(county);
        self.state.form.reset_institution();
        self.state.institutions.clear();
        self.state.institution_details = None;
        self.state.time_options.clear();
        self.persist()?;

        self.state.institutions = self.api.list_institutions(county).map_err(|e| {
            log::error!("Failed to fetch institutions for county {county}: {e}");
            e
        })?;
        Ok(&self.state.institutions)
    }

    /// Selects an institution of the current county and loads the details of
    /// its type.
    pub fn select_institution(&mut self, institution: InstitutionId) -> ServiceResult<()> {
        let institution_type = self
            .state
            .institutions
            .iter()
            .find(|i| i.id == institution)
            .map(|i| i.institution_type.clone())
            .ok_or_else(|| {
                ServiceError::Validation(
                    "Institutia selectata nu apartine judetului ales.".to_string(),
                )
            })?;

        self.state.form.institution.institution = Some(institution);
        self.persist()?;

        let details = self
            .api
            .get_institution_details(&institution_type)
            .map_err(|e| {
                log::error!("Failed to fetch details for institution type {institution_type}: {e}");
                e
            })?;
        self.state.institution_details = Some(details);

        if let Some(date) = self.state.form.appointment.date {
            self.refresh_time_options(institution, date)?;
        }
        Ok(())
    }

    pub fn select_service(&mut self, service: ServiceId) -> ServiceResult<()> {
        let offered = self
            .state
            .institution_details
            .as_ref()
            .is_some_and(|d| d.service(service).is_some());
        if !offered {
            return Err(ServiceError::Validation(
                "Serviciul selectat nu este oferit de aceasta institutie.".to_string(),
            ));
        }

        self.state.form.appointment.service = Some(service);
        self.persist()
    }

    /// Selects a date and polls the slots offered on it.
    pub fn select_date(&mut self, date: NaiveDate) -> ServiceResult<&[NaiveDateTime]> {
        self.state.form.appointment.date = Some(date);
        self.persist()?;

        if let Some(institution) = self.state.form.institution.institution {
            self.refresh_time_options(institution, date)?;
        }
        Ok(&self.state.time_options)
    }

    /// Selects one of the current time options.
    pub fn select_time(&mut self, slot: NaiveDateTime) -> ServiceResult<()> {
        if !self.state.time_options.contains(&slot) {
            return Err(ServiceError::Validation(
                "Ora selectata nu mai este disponibila.".to_string(),
            ));
        }

        self.state.form.appointment.time = Some(slot);
        self.persist()
    }

    /// Replaces the contact details; they are validated on submission.
    pub fn update_contact(&mut self, user: UserGroup) -> ServiceResult<()> {
        self.state.form.user = user;
        self.persist()
    }

    pub fn set_step(&mut self, step: u32) -> ServiceResult<()> {
        self.state.current_step = step.max(FIRST_STEP);
        self.persist()
    }

    /// Submits the current form.
    ///
    /// On success the stored draft is removed and the form starts over.
    pub fn submit(&mut self) -> SubmissionOutcome {
        let state = &self.state;
        let outcome = self.submitter.submit(&self.api, || {
            let payload = AppointmentPayload::try_from(&state.form)?;
            build_appointment(
                payload,
                &state.institutions,
                state.institution_details.as_ref(),
            )
        });

        if let SubmissionOutcome::Succeeded(_) = outcome {
            if let Err(e) = self.reset() {
                log::error!("Failed to clear draft after submission: {e}");
            }
        }
        outcome
    }

    /// Discards the draft and starts over, keeping the county list.
    pub fn reset(&mut self) -> ServiceResult<()> {
        let counties = mem::take(&mut self.state.counties);
        self.state = WizardState {
            counties,
            ..WizardState::default()
        };
        clear_draft(&self.storage)
    }

    fn refresh_time_options(
        &mut self,
        institution: InstitutionId,
        date: NaiveDate,
    ) -> ServiceResult<()> {
        let options = fetch_time_options(&self.api, institution, date)?;

        let appointment = &mut self.state.form.appointment;
        if appointment.time.is_some_and(|time| !options.contains(&time)) {
            appointment.time = None;
            self.state.time_options = options;
            return self.persist();
        }
        self.state.time_options = options;
        Ok(())
    }

    fn persist(&self) -> ServiceResult<()> {
        save_draft(&self.storage, &self.state.form, self.state.current_step)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::api::mock::MockBookingApi;
    use crate::domain::appointment::AppointmentCreated;
    use crate::domain::institution::Availability;
    use crate::domain::types::AppointmentId;
    use crate::services::draft::DraftSnapshot;
    use crate::storage::{DRAFT_KEY, InMemoryStorage};

    fn slot(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn cluj() -> CountyId {
        CountyId::new(12).unwrap()
    }

    fn primaria() -> InstitutionId {
        InstitutionId::new(3).unwrap()
    }

    fn expect_directory(api: &mut MockBookingApi) {
        api.expect_list_institutions().returning(|_| {
            Ok(vec![Institution {
                id: InstitutionId::new(3).unwrap(),
                name: "Primaria Cluj".to_string(),
                institution_type: "PRIMARIE".to_string(),
                county: Some("Cluj".to_string()),
            }])
        });
        api.expect_get_institution_details().returning(|_| {
            Ok(InstitutionDetails {
                id: 3,
                name: Some("Primaria Cluj".to_string()),
                opening_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                closing_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                max_appointments_per_day: 20,
                available_services: vec![PublicService {
                    id: ServiceId::new(1).unwrap(),
                    name: "Eliberare carte de identitate".to_string(),
                }],
                availability: Vec::new(),
            })
        });
        api.expect_get_availability().returning(|id, _| {
            Ok(Availability {
                institution_id: id,
                available_slots: vec![slot(1, 9), slot(1, 10), slot(2, 9)],
            })
        });
    }

    fn filled_wizard<'a>(
        api: MockBookingApi,
        storage: &'a InMemoryStorage,
        phone: &str,
    ) -> BookingWizard<MockBookingApi, &'a InMemoryStorage> {
        let mut wizard = BookingWizard::new(api, storage, Duration::from_millis(2000));
        wizard.select_county(cluj()).unwrap();
        wizard.select_institution(primaria()).unwrap();
        wizard.select_service(ServiceId::new(1).unwrap()).unwrap();
        wizard
            .select_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .unwrap();
        wizard.select_time(slot(1, 10)).unwrap();
        wizard
            .update_contact(UserGroup {
                name: "Ion Popescu".to_string(),
                email: "ion@example.com".to_string(),
                phone: phone.to_string(),
            })
            .unwrap();
        wizard
    }

    fn stored_snapshot(storage: &InMemoryStorage) -> Option<DraftSnapshot> {
        storage
            .get_item(DRAFT_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn every_change_is_persisted() {
        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        let storage = InMemoryStorage::new();

        let wizard = filled_wizard(api, &storage, "0712345678");

        let snapshot = stored_snapshot(&storage).unwrap();
        assert_eq!(&snapshot.form_data, wizard.form());
        assert_eq!(wizard.state().time_options, vec![slot(1, 9), slot(1, 10)]);
    }

    #[test]
    fn changing_county_clears_institution() {
        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        let storage = InMemoryStorage::new();
        let mut wizard = filled_wizard(api, &storage, "0712345678");

        wizard.select_county(CountyId::new(4).unwrap()).unwrap();

        let snapshot = stored_snapshot(&storage).unwrap();
        assert_eq!(snapshot.form_data.institution.institution, None);
        assert_eq!(
            snapshot.form_data.institution.county,
            Some(CountyId::new(4).unwrap())
        );
        assert!(wizard.state().institution_details.is_none());
    }

    #[test]
    fn slots_outside_time_options_are_rejected() {
        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        let storage = InMemoryStorage::new();
        let mut wizard = filled_wizard(api, &storage, "0712345678");

        let result = wizard.select_time(slot(2, 9));

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(wizard.form().appointment.time, Some(slot(1, 10)));
    }

    #[test]
    fn new_date_drops_time_it_does_not_offer() {
        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        let storage = InMemoryStorage::new();
        let mut wizard = filled_wizard(api, &storage, "0712345678");

        let options = wizard
            .select_date(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
            .unwrap()
            .to_vec();

        assert_eq!(options, vec![slot(2, 9)]);
        assert_eq!(wizard.form().appointment.time, None);
        let snapshot = stored_snapshot(&storage).unwrap();
        assert_eq!(snapshot.form_data.appointment.time, None);
        assert_eq!(&snapshot.form_data, wizard.form());
    }

    #[test]
    fn institution_from_another_county_is_rejected() {
        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        let storage = InMemoryStorage::new();
        let mut wizard = BookingWizard::new(api, &storage, Duration::ZERO);
        wizard.select_county(cluj()).unwrap();

        let result = wizard.select_institution(InstitutionId::new(99).unwrap());

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn malformed_phone_blocks_submission_without_request() {
        for phone in ["0812345678", "071234567", "+40712345678", ""] {
            let mut api = MockBookingApi::new();
            expect_directory(&mut api);
            api.expect_create_appointment().never();
            let storage = InMemoryStorage::new();
            let mut wizard = filled_wizard(api, &storage, phone);

            let outcome = wizard.submit();

            assert!(
                matches!(outcome, SubmissionOutcome::Rejected { .. }),
                "{phone} should be rejected"
            );
            assert!(stored_snapshot(&storage).is_some());
        }
    }

    #[test]
    fn successful_submission_clears_draft() {
        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        api.expect_create_appointment()
            .withf(|appointment| {
                appointment.appointment_time == slot(1, 10)
                    && appointment.customer_phone.as_str() == "0712345678"
            })
            .times(1)
            .returning(|_| {
                Ok(AppointmentCreated {
                    id: AppointmentId::new(15).unwrap(),
                    message: None,
                })
            });
        let storage = InMemoryStorage::new();
        let mut wizard = filled_wizard(api, &storage, "0712345678");
        wizard.set_step(3).unwrap();

        let outcome = wizard.submit();

        assert!(matches!(outcome, SubmissionOutcome::Succeeded(_)));
        assert_eq!(storage.get_item(DRAFT_KEY).unwrap(), None);
        assert_eq!(wizard.form(), &AppointmentForm::default());
        assert_eq!(wizard.state().current_step, FIRST_STEP);
    }

    #[test]
    fn saved_draft_resumes_with_same_selection_and_step() {
        let storage = InMemoryStorage::new();
        {
            let mut api = MockBookingApi::new();
            expect_directory(&mut api);
            let mut wizard = BookingWizard::new(api, &storage, Duration::ZERO);
            wizard.select_county(cluj()).unwrap();
            wizard.select_institution(primaria()).unwrap();
            wizard.set_step(2).unwrap();
        }

        let mut api = MockBookingApi::new();
        expect_directory(&mut api);
        let mut wizard = BookingWizard::new(api, &storage, Duration::ZERO);
        let report = wizard.resume().unwrap().unwrap();

        assert!(report.is_complete());
        assert_eq!(wizard.form().institution.county, Some(cluj()));
        assert_eq!(wizard.form().institution.institution, Some(primaria()));
        assert_eq!(wizard.state().current_step, 2);
    }

    #[test]
    fn invalid_draft_leaves_default_state() {
        let storage = InMemoryStorage::new();
        storage.set_item(DRAFT_KEY, "[1, 2").unwrap();
        let mut wizard = BookingWizard::new(MockBookingApi::new(), &storage, Duration::ZERO);

        assert_eq!(wizard.resume().unwrap(), None);
        assert_eq!(wizard.state(), &WizardState::default());
        assert_eq!(storage.get_item(DRAFT_KEY).unwrap(), None);
    }
}
