//! Request field validation, run before a request reaches the auth core.

use bridge_core::{AuthError, AuthResult};

use crate::pb;

pub const MIN_NAME_LEN: usize = 3;

pub trait Validate {
    fn validate(&self) -> AuthResult<()>;
}

impl Validate for pb::LoginRequest {
    fn validate(&self) -> AuthResult<()> {
        required("email", &self.email)?;
        required("password", &self.password)
    }
}

impl Validate for pb::RegisterRequest {
    fn validate(&self) -> AuthResult<()> {
        name(&self.name)?;
        email(&self.email)?;
        required("phone_number", &self.phone_number)?;
        required("password", &self.password)?;
        required("confirm_password", &self.confirm_password)
    }
}

impl Validate for pb::UpdateProfileRequest {
    fn validate(&self) -> AuthResult<()> {
        if let Some(n) = &self.name {
            name(n)?;
        }
        if let Some(phone) = &self.phone_number {
            required("phone_number", phone)?;
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::invalid_argument(format!("{field} is required")));
    }
    Ok(())
}

fn name(value: &str) -> AuthResult<()> {
    if value.trim().chars().count() < MIN_NAME_LEN {
        return Err(AuthError::invalid_argument(format!(
            "name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn email(value: &str) -> AuthResult<()> {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(AuthError::invalid_argument("email must be a valid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> pb::RegisterRequest {
        pb::RegisterRequest {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone_number: "+2348000000000".to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert_eq!(register().validate(), Ok(()));
    }

    #[test]
    fn short_name_is_rejected_with_message() {
        let req = pb::RegisterRequest {
            name: "Al".to_string(),
            ..register()
        };
        assert_eq!(
            req.validate(),
            Err(AuthError::InvalidArgument(
                "name must be at least 3 characters".to_string()
            ))
        );

        let req = pb::RegisterRequest {
            name: "Ada".to_string(),
            ..register()
        };
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "ada", "@example.com", "ada@", "a@b@c"] {
            let req = pb::RegisterRequest {
                email: bad.to_string(),
                ..register()
            };
            assert!(req.validate().is_err(), "{bad}");
        }
    }

    #[test]
    fn short_password_is_accepted_but_empty_is_not() {
        let req = pb::RegisterRequest {
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
            ..register()
        };
        assert_eq!(req.validate(), Ok(()));

        let req = pb::RegisterRequest {
            password: String::new(),
            ..register()
        };
        assert_eq!(
            req.validate(),
            Err(AuthError::InvalidArgument("password is required".to_string()))
        );
    }

    #[test]
    fn mismatched_confirmation_is_left_to_the_service() {
        let req = pb::RegisterRequest {
            confirm_password: "something else".to_string(),
            ..register()
        };
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn login_requires_both_fields() {
        let req = pb::LoginRequest {
            email: "ada@example.com".to_string(),
            password: String::new(),
        };
        assert_eq!(
            req.validate(),
            Err(AuthError::InvalidArgument("password is required".to_string()))
        );
    }

    #[test]
    fn empty_profile_update_is_fine() {
        assert_eq!(pb::UpdateProfileRequest::default().validate(), Ok(()));
        let req = pb::UpdateProfileRequest {
            name: Some("Al".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
