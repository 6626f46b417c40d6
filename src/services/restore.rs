//! Replays a stored draft against fresh remote data.
//!
//! Restoration runs as an ordered list of steps. Each step receives the state
//! left by the previous one and either continues or stops the pipeline; a
//! stopped pipeline keeps whatever was restored so far.

use crate::api::DirectoryApi;
use crate::domain::institution::County;
use crate::forms::appointment::AppointmentForm;
use crate::services::availability::fetch_time_options;
use crate::services::draft::DraftSnapshot;
use crate::services::wizard::WizardState;

/// Saved draft paired with the wizard being rebuilt from it.
#[derive(Clone, Debug)]
pub struct RestoreState {
    pub saved: AppointmentForm,
    pub wizard: WizardState,
}

#[derive(Debug)]
pub enum RestoreFlow {
    Continue(RestoreState),
    Stop(RestoreState),
}

pub type RestoreStep = fn(&dyn DirectoryApi, RestoreState) -> RestoreFlow;

/// Restoration order: every step depends on data fetched by the one before.
pub const RESTORE_STEPS: [(&str, RestoreStep); 4] = [
    ("county", restore_county),
    ("institution", restore_institution),
    ("institution_details", restore_institution_details),
    ("availability", restore_availability),
];

/// Which steps ran to completion and where the pipeline stopped, if it did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub completed: Vec<&'static str>,
    pub stopped_at: Option<&'static str>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.stopped_at.is_none()
    }
}

/// Rebuilds wizard state from `snapshot`.
///
/// Contact details and the step index are restored up front; the selection
/// chain is replayed through [`RESTORE_STEPS`].
pub fn restore_snapshot(
    api: &dyn DirectoryApi,
    snapshot: DraftSnapshot,
    counties: Vec<County>,
) -> (WizardState, RestoreReport) {
    let mut wizard = WizardState {
        counties,
        ..WizardState::default()
    };
    wizard.form.user = snapshot.form_data.user.clone();
    if snapshot.current_step > 0 {
        wizard.current_step = snapshot.current_step;
    }

    let mut state = RestoreState {
        saved: snapshot.form_data,
        wizard,
    };
    let mut report = RestoreReport::default();

    for (name, step) in RESTORE_STEPS {
        match step(api, state) {
            RestoreFlow::Continue(next) => {
                report.completed.push(name);
                state = next;
            }
            RestoreFlow::Stop(last) => {
                log::debug!("Draft restoration stopped at step {name}");
                report.stopped_at = Some(name);
                state = last;
                break;
            }
        }
    }

    (state.wizard, report)
}

fn restore_county(api: &dyn DirectoryApi, mut state: RestoreState) -> RestoreFlow {
    let Some(county) = state.saved.institution.county else {
        return RestoreFlow::Stop(state);
    };
    state.wizard.form.institution.county = Some(county);

    match api.list_institutions(county) {
        Ok(institutions) => {
            state.wizard.institutions = institutions;
            RestoreFlow::Continue(state)
        }
        Err(e) => {
            log::warn!("Failed to fetch institutions for county {county}: {e}");
            RestoreFlow::Stop(state)
        }
    }
}

fn restore_institution(_api: &dyn DirectoryApi, mut state: RestoreState) -> RestoreFlow {
    let Some(saved) = state.saved.institution.institution else {
        return RestoreFlow::Stop(state);
    };

    if state.wizard.institutions.iter().any(|i| i.id == saved) {
        state.wizard.form.institution.institution = Some(saved);
        RestoreFlow::Continue(state)
    } else {
        log::warn!("Saved institution {saved} is no longer offered in its county");
        RestoreFlow::Stop(state)
    }
}

fn restore_institution_details(api: &dyn DirectoryApi, mut state: RestoreState) -> RestoreFlow {
    let Some(institution) = state.wizard.selected_institution().cloned() else {
        return RestoreFlow::Stop(state);
    };

    let details = match api.get_institution_details(&institution.institution_type) {
        Ok(details) => details,
        Err(e) => {
            log::warn!(
                "Failed to fetch details for institution type {}: {e}",
                institution.institution_type
            );
            return RestoreFlow::Stop(state);
        }
    };

    let saved = &state.saved.appointment;
    let appointment = &mut state.wizard.form.appointment;
    appointment.service = saved.service.filter(|id| details.service(*id).is_some());
    appointment.date = saved.date;
    appointment.time = saved.time;
    state.wizard.institution_details = Some(details);

    RestoreFlow::Continue(state)
}

fn restore_availability(api: &dyn DirectoryApi, mut state: RestoreState) -> RestoreFlow {
    let (Some(institution), Some(date)) = (
        state.wizard.form.institution.institution,
        state.wizard.form.appointment.date,
    ) else {
        return RestoreFlow::Continue(state);
    };

    match fetch_time_options(api, institution, date) {
        Ok(options) => {
            let appointment = &mut state.wizard.form.appointment;
            if appointment.time.is_some_and(|time| !options.contains(&time)) {
                log::info!("Saved time is no longer available on {date}; clearing it");
                appointment.time = None;
            }
            state.wizard.time_options = options;
            RestoreFlow::Continue(state)
        }
        Err(_) => RestoreFlow::Stop(state),
    }
}
