//! Error types shared by the metrics source, the tracker and user actions.

use thiserror::Error;

/// Errors that can occur when querying a [`MetricsSource`](crate::source::MetricsSource).
///
/// Every variant is recoverable: the caller skips the reading for this
/// cycle and tries again on the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The reading could not be taken right now.
    #[error("metrics source unavailable: {0}")]
    Unavailable(String),

    /// The OS refused access to the requested data.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The process exited between enumeration and inspection.
    #[error("no such process: {0}")]
    NoSuchProcess(u32),

    /// The platform does not expose this data.
    #[error("not supported on this platform: {0}")]
    Unsupported(String),
}

/// A user-initiated action that failed.
///
/// These never affect tracker state; the presenter shows them as a
/// status message.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Terminating a process failed.
    #[error("failed to terminate process {pid}: {source}")]
    Terminate {
        pid: u32,
        #[source]
        source: SourceError,
    },

    /// Nothing is selected to act on.
    #[error("no process selected")]
    NothingSelected,

    /// Writing an export file failed.
    #[error("export failed: {0}")]
    Export(String),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layered config could not be loaded or deserialized.
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// A value was present but not acceptable.
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_error_mentions_pid_and_cause() {
        let err = ActionError::Terminate {
            pid: 42,
            source: SourceError::PermissionDenied("signal".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn config_invalid_names_the_key() {
        let err = ConfigError::Invalid {
            key: "interval",
            reason: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for `interval`: must be greater than zero"
        );
    }
}
