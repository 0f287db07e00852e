use std::time::Duration;
use thiserror::Error;

/// Classgate errors
#[derive(Error, Debug)]
pub enum ClassgateError {
    #[error("Discovery error: {0}")]
    Discovery(#[source] kube::Error),

    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] kube::Error),

    #[error("Timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::error::ErrorResponse;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code,
        })
    }

    #[test]
    fn test_kube_errors_convert_to_kubernetes() {
        let err: ClassgateError = api_error(403).into();
        assert!(matches!(
            err,
            ClassgateError::Kubernetes(kube::Error::Api(ref r)) if r.code == 403
        ));
        assert!(err.to_string().starts_with("Kubernetes error:"));
    }

    #[test]
    fn test_discovery_errors_stay_distinct() {
        let err = ClassgateError::Discovery(api_error(503));
        assert!(err.to_string().starts_with("Discovery error:"));
    }
}
