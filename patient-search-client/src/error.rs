use std::io;
use std::path::PathBuf;

/// Errors produced while looking up patients.
///
/// None of these escape [`crate::PatientClient`]; the facade logs them and
/// degrades to an empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("lookup key is empty")]
    InvalidKey,
    #[error("remote search for {key:?} failed: {message}")]
    RemoteCall { key: String, message: String },
    #[error("unable to read lines from {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidKey,
    RemoteCall,
    SourceUnavailable,
}

impl Error {
    /// Shorthand for search collaborators reporting a failed call.
    pub fn remote(key: impl Into<String>, message: impl ToString) -> Self {
        Self::RemoteCall {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidKey => ErrorKind::InvalidKey,
            Error::RemoteCall { .. } => ErrorKind::RemoteCall,
            Error::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
        }
    }
}
