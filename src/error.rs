use crate::client::BackendError;

/// Errors returned while building a hook or writing a record.
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    #[error("could not check whether index {index} exists: {source}")]
    IndexExists {
        index: String,
        #[source]
        source: BackendError,
    },

    #[error("could not create index {index}: {source}")]
    CreateIndex {
        index: String,
        #[source]
        source: BackendError,
    },

    /// The backend answered the create request without acknowledging it.
    #[error("cannot create index {index}")]
    CannotCreateIndex { index: String },

    #[error("failed to write document to index {index}: {source}")]
    Write {
        index: String,
        #[source]
        source: BackendError,
    },

    #[error("synchronous write needs a multi-thread runtime or no runtime at all")]
    BlockingUnsupported,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HookError {
    /// The backend error behind this failure, if any.
    pub fn backend_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            HookError::IndexExists { source, .. }
            | HookError::CreateIndex { source, .. }
            | HookError::Write { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn error_display_messages() {
        let err = HookError::CannotCreateIndex { index: "logs".into() };
        assert_eq!(err.to_string(), "cannot create index logs");

        let err = HookError::Write {
            index: "logs".into(),
            source: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write document to index logs: connection refused"
        );
    }

    #[test]
    fn backend_error_is_kept_as_source() {
        let err = HookError::IndexExists {
            index: "logs".into(),
            source: "timeout".into(),
        };
        assert_eq!(err.source().map(|e| e.to_string()), Some("timeout".to_string()));
        assert_eq!(err.backend_error().map(|e| e.to_string()), Some("timeout".to_string()));
        assert!(HookError::CannotCreateIndex { index: "x".into() }.backend_error().is_none());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HookError>();
    }
}
