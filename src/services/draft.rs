//! Persistence bridge between the wizard and local storage.
//!
//! The whole draft is written on every change under [`DRAFT_KEY`]. There is
//! no schema version: a snapshot that no longer parses is discarded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forms::appointment::AppointmentForm;
use crate::services::ServiceResult;
use crate::storage::{DRAFT_KEY, LocalStorage};

/// Stored shape of the draft: `{ formData, currentStep }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub form_data: AppointmentForm,
    #[serde(default)]
    pub current_step: u32,
}

/// Overwrites the stored snapshot with the current form and step.
pub fn save_draft<S>(storage: &S, form: &AppointmentForm, current_step: u32) -> ServiceResult<()>
where
    S: LocalStorage + ?Sized,
{
    let snapshot = DraftSnapshot {
        form_data: form.clone(),
        current_step,
    };
    let serialized = serde_json::to_string(&snapshot).map_err(|err| {
        log::error!("Failed to serialize draft: {err}");
        crate::storage::errors::StorageError::from(err)
    })?;
    storage.set_item(DRAFT_KEY, &serialized)?;
    Ok(())
}

/// Reads the stored snapshot.
///
/// A snapshot that fails to parse is removed and reported as absent.
pub fn load_draft<S>(storage: &S) -> ServiceResult<Option<DraftSnapshot>>
where
    S: LocalStorage + ?Sized,
{
    let Some(raw) = storage.get_item(DRAFT_KEY)? else {
        return Ok(None);
    };

    match parse_snapshot(&raw) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(err) => {
            log::warn!("Discarding unreadable draft: {err}");
            storage.remove_item(DRAFT_KEY)?;
            Ok(None)
        }
    }
}

/// Removes the stored snapshot.
pub fn clear_draft<S>(storage: &S) -> ServiceResult<()>
where
    S: LocalStorage + ?Sized,
{
    storage.remove_item(DRAFT_KEY)?;
    Ok(())
}

/// Accepts the `{ formData, currentStep }` envelope as well as a bare form
/// object written before the step index was stored.
fn parse_snapshot(raw: &str) -> Result<DraftSnapshot, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    if value.get("formData").is_some() {
        serde_json::from_value(value)
    } else {
        let form_data: AppointmentForm = serde_json::from_value(value)?;
        Ok(DraftSnapshot {
            form_data,
            current_step: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CountyId;
    use crate::storage::InMemoryStorage;
    use crate::storage::mock::MockStorage;

    #[test]
    fn save_then_load_returns_same_snapshot() {
        let storage = InMemoryStorage::new();
        let mut form = AppointmentForm::default();
        form.institution.county = Some(CountyId::new(5).unwrap());
        form.user.name = "Ana".to_string();

        save_draft(&storage, &form, 2).unwrap();
        let snapshot = load_draft(&storage).unwrap().unwrap();

        assert_eq!(snapshot.form_data, form);
        assert_eq!(snapshot.current_step, 2);
    }

    #[test]
    fn stored_json_uses_envelope_layout() {
        let storage = InMemoryStorage::new();
        save_draft(&storage, &AppointmentForm::default(), 3).unwrap();

        let raw = storage.get_item(DRAFT_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["currentStep"], 3);
        assert!(value["formData"]["institution"].is_object());
    }

    #[test]
    fn invalid_json_is_removed() {
        let storage = InMemoryStorage::new();
        storage.set_item(DRAFT_KEY, "{not json").unwrap();

        assert_eq!(load_draft(&storage).unwrap(), None);
        assert_eq!(storage.get_item(DRAFT_KEY).unwrap(), None);
    }

    #[test]
    fn bare_form_is_accepted() {
        let storage = InMemoryStorage::new();
        storage
            .set_item(DRAFT_KEY, r#"{"institution": {"county": 9}}"#)
            .unwrap();

        let snapshot = load_draft(&storage).unwrap().unwrap();

        assert_eq!(
            snapshot.form_data.institution.county,
            Some(CountyId::new(9).unwrap())
        );
        assert_eq!(snapshot.current_step, 0);
    }

    #[test]
    fn missing_snapshot_does_not_touch_storage() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_item()
            .withf(|key| key == DRAFT_KEY)
            .times(1)
            .returning(|_| Ok(None));
        storage.expect_remove_item().never();

        assert_eq!(load_draft(&storage).unwrap(), None);
    }
}
