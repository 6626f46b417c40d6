use serde::Deserialize;
use validator::Validate;

use crate::domain::session::Credentials;
use crate::domain::types::CustomerEmail;
use crate::forms::FormError;

#[derive(Clone, Debug, Deserialize, Validate)]
/// Form data for signing in.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl TryFrom<LoginForm> for Credentials {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let email = CustomerEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?;
        Ok(Self {
            email: email.into_inner(),
            password: form.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_normalizes_email() {
        let form = LoginForm {
            email: "Admin@Example.com".to_string(),
            password: "secret".to_string(),
        };

        let credentials = Credentials::try_from(form).unwrap();

        assert_eq!(credentials.email, "admin@example.com");
    }

    #[test]
    fn login_form_requires_password() {
        let form = LoginForm {
            email: "admin@example.com".to_string(),
            password: String::new(),
        };

        assert!(matches!(
            Credentials::try_from(form),
            Err(FormError::Validation(_))
        ));
    }
}
