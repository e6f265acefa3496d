use std::path::PathBuf;

/// Errors raised while running the commit gate.
///
/// `Configuration` and the transport-class variants abort the run with exit
/// code 1. `MalformedResponse` is folded into the absent-verdict policy and
/// `Persistence` is only logged.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("review endpoint returned HTTP {status}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed review response: {0}")]
    MalformedResponse(String),

    #[error("failed to write report {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GateError {
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            GateError::MalformedResponse(_) | GateError::Persistence { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_and_persistence_are_not_fatal() {
        assert!(!GateError::MalformedResponse("no candidates".into()).is_fatal());
        let err = GateError::Persistence {
            path: PathBuf::from("/tmp/report.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("/tmp/report.md"));
    }

    #[test]
    fn configuration_and_transport_are_fatal() {
        assert!(GateError::Configuration("missing key".into()).is_fatal());
        assert!(GateError::Transport("connection refused".into()).is_fatal());
        let err = GateError::HttpStatus {
            status: 403,
            body: "{\"error\":\"denied\"}".into(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "review endpoint returned HTTP 403");
    }
}
