use http::{Result as HttpResponse, StatusCode};
use starter_core::OAuth2Error;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Auth failures are reported as 401; everything else is a server fault.
impl<T> IntoResponseError<T> for Result<T, OAuth2Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                OAuth2Error::ProviderNotFound(_)
                | OAuth2Error::ProviderMismatch { .. }
                | OAuth2Error::SessionNotFound
                | OAuth2Error::StateMismatch
                | OAuth2Error::MissingCode
                | OAuth2Error::ProviderDenied(_)
                | OAuth2Error::TokenExchange(_)
                | OAuth2Error::FetchUserInfo(_)
                | OAuth2Error::Session(_) => StatusCode::UNAUTHORIZED,
                OAuth2Error::Serde(_) | OAuth2Error::Internal(_) | OAuth2Error::Utils(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (status, e.to_string())
        })
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starter_core::{SessionError, UtilError};

    fn status_of(err: OAuth2Error) -> StatusCode {
        let result: Result<(), OAuth2Error> = Err(err);
        match result.into_response_error() {
            Err((status, _)) => status,
            Ok(()) => panic!("Expected an error"),
        }
    }

    #[test]
    fn test_unknown_provider_is_unauthorized() {
        let result: Result<(), OAuth2Error> =
            Err(OAuth2Error::ProviderNotFound("github".to_string()));

        let (status, message) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "no provider for github exists");
    }

    #[test]
    fn test_auth_failures_are_unauthorized() {
        let failures = [
            OAuth2Error::StateMismatch,
            OAuth2Error::SessionNotFound,
            OAuth2Error::MissingCode,
            OAuth2Error::ProviderDenied("access_denied".to_string()),
            OAuth2Error::TokenExchange("400 Bad Request".to_string()),
            OAuth2Error::FetchUserInfo("401 Unauthorized".to_string()),
            OAuth2Error::ProviderMismatch {
                expected: "google".to_string(),
                actual: "github".to_string(),
            },
            OAuth2Error::Session(SessionError::InvalidSignature),
        ];

        for err in failures {
            let label = format!("{err:?}");
            assert_eq!(status_of(err), StatusCode::UNAUTHORIZED, "{label}");
        }
    }

    #[test]
    fn test_internal_errors() {
        assert_eq!(
            status_of(OAuth2Error::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(OAuth2Error::Utils(UtilError::Crypto("rng".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ok_passes_through() {
        let result: Result<u8, OAuth2Error> = Ok(7);
        assert_eq!(result.into_response_error(), Ok(7));
    }

    #[test]
    fn test_http_error() {
        let result = http::Response::builder()
            .header("invalid\nheader", "value")
            .body(());

        let (status, _) = result.into_response_error().unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
