use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::types::{
    CountyId, CustomerEmail, CustomerName, InstitutionId, PhoneNumber, ServiceId,
};
use crate::forms::FormError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Full state of the booking wizard, grouped the way the steps present it.
pub struct AppointmentForm {
    #[serde(default)]
    #[validate(nested)]
    pub institution: InstitutionGroup,
    #[serde(default)]
    #[validate(nested)]
    pub appointment: AppointmentGroup,
    #[serde(default)]
    #[validate(nested)]
    pub user: UserGroup,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
/// Step one: where the appointment takes place.
pub struct InstitutionGroup {
    #[validate(required)]
    pub county: Option<CountyId>,
    #[validate(required)]
    pub institution: Option<InstitutionId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
/// Step two: what and when.
pub struct AppointmentGroup {
    #[validate(required)]
    pub service: Option<ServiceId>,
    #[validate(required)]
    pub date: Option<NaiveDate>,
    /// Slot picked from the time options; only its time of day is used.
    #[validate(required)]
    pub time: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
/// Step three: contact details of the customer.
pub struct UserGroup {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    PhoneNumber::new(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("phone_pattern"))
}

impl AppointmentForm {
    /// Clears the institution selection, as happens whenever the county changes.
    pub fn reset_institution(&mut self) {
        self.institution.institution = None;
    }
}

/// Typed, validated view of a complete [`AppointmentForm`].
#[derive(Clone, Debug, PartialEq)]
pub struct AppointmentPayload {
    pub county: CountyId,
    pub institution: InstitutionId,
    pub service: ServiceId,
    /// Selected date combined with the time of day of the selected slot.
    pub appointment_time: NaiveDateTime,
    pub name: CustomerName,
    pub email: CustomerEmail,
    pub phone: PhoneNumber,
}

impl TryFrom<&AppointmentForm> for AppointmentPayload {
    type Error = FormError;

    fn try_from(form: &AppointmentForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let county = form
            .institution
            .county
            .ok_or(FormError::MissingField("county"))?;
        let institution = form
            .institution
            .institution
            .ok_or(FormError::MissingField("institution"))?;
        let service = form
            .appointment
            .service
            .ok_or(FormError::MissingField("service"))?;
        let date = form
            .appointment
            .date
            .ok_or(FormError::MissingField("date"))?;
        let time = form
            .appointment
            .time
            .ok_or(FormError::MissingField("time"))?;

        Ok(Self {
            county,
            institution,
            service,
            appointment_time: combine_date_and_time(date, time),
            name: CustomerName::new(form.user.name.as_str()).map_err(|_| FormError::InvalidName)?,
            email: CustomerEmail::new(form.user.email.as_str())
                .map_err(|_| FormError::InvalidEmail)?,
            phone: PhoneNumber::new(form.user.phone.as_str())
                .map_err(|_| FormError::InvalidPhoneNumber)?,
        })
    }
}

/// Places the hour and minute of `slot` on `date`, dropping seconds.
pub fn combine_date_and_time(date: NaiveDate, slot: NaiveDateTime) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(slot.hour(), slot.minute(), 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> AppointmentForm {
        AppointmentForm {
            institution: InstitutionGroup {
                county: Some(CountyId::new(12).unwrap()),
                institution: Some(InstitutionId::new(3).unwrap()),
            },
            appointment: AppointmentGroup {
                service: Some(ServiceId::new(1).unwrap()),
                date: NaiveDate::from_ymd_opt(2024, 5, 1),
                time: NaiveDate::from_ymd_opt(2024, 5, 1)
                    .and_then(|d| d.and_hms_opt(9, 30, 15)),
            },
            user: UserGroup {
                name: "Ion Popescu".to_string(),
                email: "ion@example.com".to_string(),
                phone: "0712345678".to_string(),
            },
        }
    }

    #[test]
    fn complete_form_converts_to_payload() {
        let payload = AppointmentPayload::try_from(&complete_form()).unwrap();

        assert_eq!(payload.institution.get(), 3);
        assert_eq!(
            payload.appointment_time,
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
        assert_eq!(payload.phone.as_str(), "0712345678");
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let mut form = complete_form();
        form.appointment.time = None;

        let result = AppointmentPayload::try_from(&form);

        assert!(matches!(result, Err(FormError::Validation(_))));
    }

    #[test]
    fn malformed_contact_details_fail_validation() {
        let mut form = complete_form();
        form.user.email = "not-an-email".to_string();
        assert!(form.validate().is_err());

        let mut form = complete_form();
        form.user.phone = "0812345678".to_string();
        assert!(form.validate().is_err());

        let mut form = complete_form();
        form.user.name = "   ".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn draft_json_uses_grouped_camel_case_layout() {
        let value = serde_json::to_value(complete_form()).unwrap();

        assert_eq!(value["institution"]["county"], 12);
        assert_eq!(value["appointment"]["date"], "2024-05-01");
        assert_eq!(value["appointment"]["time"], "2024-05-01T09:30:15");
        assert_eq!(value["user"]["phone"], "0712345678");
    }

    #[test]
    fn partial_draft_parses_with_defaults() {
        let form: AppointmentForm =
            serde_json::from_str(r#"{"institution": {"county": 4}}"#).unwrap();

        assert_eq!(form.institution.county, Some(CountyId::new(4).unwrap()));
        assert_eq!(form.institution.institution, None);
        assert_eq!(form.user, UserGroup::default());
    }
}
