//! Conversions from external infrastructure errors into domain errors.

use echodue_domain::EchoDueError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub EchoDueError);

impl From<InfraError> for EchoDueError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<EchoDueError> for InfraError {
    fn from(value: EchoDueError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };

        InfraError(EchoDueError::Network(message))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(err: serde_json::Error) -> Self {
        InfraError(EchoDueError::InvalidInput(format!("malformed JSON: {err}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        InfraError(EchoDueError::Storage(err.to_string()))
    }
}

impl From<toml::ser::Error> for InfraError {
    fn from(err: toml::ser::Error) -> Self {
        InfraError(EchoDueError::Storage(format!("failed to serialize store: {err}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(err: toml::de::Error) -> Self {
        InfraError(EchoDueError::Storage(format!("failed to parse store: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, EchoDueError::Storage(_)));
    }

    #[test]
    fn test_json_error_maps_to_invalid_input() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, EchoDueError::InvalidInput(_)));
    }
}
