use std::path::PathBuf;

use thiserror::Error;

use crate::auth::AuthError;
use crate::automation::AutomationError;
use crate::documents::{DocsError, StorageUrnError};
use crate::storage::StorageError;

/// Errors that can abort a submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The packaged bundle archive is not where it should be. Raised before
    /// any remote creation call.
    #[error("App bundle archive not found at {path}")]
    MissingBundleArchive { path: PathBuf },

    #[error("Failed to read bundle archive {path}: {source}")]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error(transparent)]
    Documents(#[from] DocsError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    MalformedStorageId(#[from] StorageUrnError),
}

/// Failure category callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    /// A local precondition failed; nothing was sent to any service.
    Precondition,
    /// A remote collaborator failed or rejected a call.
    Remote,
    /// Data from a remote collaborator had an unexpected shape.
    Parse,
}

impl SubmitError {
    pub fn kind(&self) -> SubmitErrorKind {
        match self {
            SubmitError::MissingBundleArchive { .. } | SubmitError::ArchiveRead { .. } => {
                SubmitErrorKind::Precondition
            }
            SubmitError::Auth(_)
            | SubmitError::Automation(_)
            | SubmitError::Documents(_)
            | SubmitError::Storage(_) => SubmitErrorKind::Remote,
            SubmitError::MalformedStorageId(_) => SubmitErrorKind::Parse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_archive_is_precondition() {
        let err = SubmitError::MissingBundleArchive {
            path: PathBuf::from("/content/IptToSatAppBundle.zip"),
        };
        assert_eq!(err.kind(), SubmitErrorKind::Precondition);
        assert!(err.to_string().contains("IptToSatAppBundle.zip"));
    }

    #[test]
    fn test_remote_errors_are_remote() {
        let err = SubmitError::from(AutomationError::Timeout);
        assert_eq!(err.kind(), SubmitErrorKind::Remote);

        let err = SubmitError::from(AuthError::Rejected("bad secret".to_string()));
        assert_eq!(err.kind(), SubmitErrorKind::Remote);
    }

    #[test]
    fn test_malformed_storage_id_is_parse() {
        let urn_err = crate::documents::parse_storage_urn("no-slashes").unwrap_err();
        let err = SubmitError::from(urn_err);
        assert_eq!(err.kind(), SubmitErrorKind::Parse);
    }
}
