use tonic::{Code, Status};

use bridge_core::{AuthError, ErrorKind};

pub fn code_for(kind: ErrorKind) -> Code {
    match kind {
        ErrorKind::InvalidArgument => Code::InvalidArgument,
        ErrorKind::Unauthenticated => Code::Unauthenticated,
        ErrorKind::PermissionDenied => Code::PermissionDenied,
        ErrorKind::AlreadyExists => Code::AlreadyExists,
        ErrorKind::NotFound => Code::NotFound,
        ErrorKind::Internal => Code::Internal,
    }
}

/// Render a domain error as a gRPC status. The message is the error's
/// display text and nothing else.
pub fn status_from(err: &AuthError) -> Status {
    Status::new(code_for(err.kind()), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_chain_failures_are_unauthenticated() {
        for err in [
            AuthError::MissingContextMetadata,
            AuthError::MissingAuthHeader,
            AuthError::MalformedToken,
            AuthError::InvalidAuthorizationScheme,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::Unauthenticated,
        ] {
            assert_eq!(status_from(&err).code(), Code::Unauthenticated, "{err:?}");
        }
    }

    #[test]
    fn messages_are_the_fixed_texts() {
        let status = status_from(&AuthError::ExpiredToken);
        assert_eq!(status.message(), "Expired access token provided.");

        let status = status_from(&AuthError::Internal);
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "Internal server error.");
    }

    #[test]
    fn registration_conflicts_are_already_exists() {
        assert_eq!(
            status_from(&AuthError::EmailExists).code(),
            Code::AlreadyExists
        );
        assert_eq!(
            status_from(&AuthError::PhoneNumberExists).code(),
            Code::AlreadyExists
        );
    }

    #[test]
    fn validation_message_is_verbatim() {
        let status = status_from(&AuthError::InvalidArgument("name is too short".to_string()));
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "name is too short");
    }

    #[test]
    fn inactive_account_is_permission_denied() {
        assert_eq!(
            status_from(&AuthError::InactiveAccount).code(),
            Code::PermissionDenied
        );
    }
}
