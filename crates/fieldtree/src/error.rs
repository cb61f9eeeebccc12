// crates/fieldtree/src/error.rs

use crate::checklist::EntryId;
use core::fmt;

/// A failure reported by the external configuration engine.
///
/// The engine's own message is kept verbatim so it can be shown to the
/// operator and logged without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::new(s)
    }
}

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::new(s)
    }
}

/// Errors from the owner-thread executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerError {
    /// The owner thread could not be spawned by the OS.
    SpawnFailed(String),
    /// The owner thread is gone: it was shut down, or a job panicked.
    Disconnected,
    /// `run` was called from the owner thread itself; waiting on its own queue
    /// would deadlock.
    Reentrant,
}

impl fmt::Display for OwnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(e) => write!(f, "Failed to spawn owner thread: {}", e),
            Self::Disconnected => write!(f, "Owner thread is no longer running"),
            Self::Reentrant => write!(f, "Owner thread cannot wait on its own queue"),
        }
    }
}

impl std::error::Error for OwnerError {}

/// Defines the error taxonomy surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The engine could not be created or acquired. Fatal for the session
    /// until it is re-initialised.
    EngineUnavailable(String),
    /// Opening a project failed; the previous session state is kept.
    ProjectLoadFailed { path: String, reason: String },
    /// Importing an XTI fragment set failed.
    ImportFailed { path: String, reason: String },
    /// The network scan was refused by the engine.
    ScanFailed(String),
    /// Saving the project failed.
    SaveFailed(String),
    /// The operation needs an opened project.
    NotLoaded,
    /// A well-known root key did not resolve to a tree node.
    RootNotFound { key: String },
    /// A single node could not be read.
    NodeUnreadable { path: String, reason: String },
    /// The engine refused a fragment write; the entry was rolled back.
    MutationRejected { label: String, reason: String },
    /// The entry id does not belong to the current checklist generation.
    UnknownEntry(EntryId),
    /// The owner thread is not available to run the request.
    OwnerUnavailable(OwnerError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineUnavailable(e) => write!(f, "Configuration engine unavailable: {}", e),
            Self::ProjectLoadFailed { path, reason } => {
                write!(f, "Error loading configuration '{}': {}", path, reason)
            }
            Self::ImportFailed { path, reason } => {
                write!(f, "Error loading XTI file '{}': {}", path, reason)
            }
            Self::ScanFailed(e) => write!(f, "Error scanning network: {}", e),
            Self::SaveFailed(e) => write!(f, "Error saving configuration: {}", e),
            Self::NotLoaded => write!(f, "No configuration is loaded"),
            Self::RootNotFound { key } => write!(f, "Could not find tree root '{}'", key),
            Self::NodeUnreadable { path, reason } => {
                write!(f, "Tree node '{}' is unreadable: {}", path, reason)
            }
            Self::MutationRejected { label, reason } => {
                write!(f, "Error setting device state of '{}': {}", label, reason)
            }
            Self::UnknownEntry(id) => write!(f, "Unknown checklist entry {}", id),
            Self::OwnerUnavailable(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

// --- From Implementations for Error Conversion ---

impl From<OwnerError> for SessionError {
    fn from(err: OwnerError) -> Self {
        SessionError::OwnerUnavailable(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_message_is_verbatim() {
        let err = SessionError::MutationRejected {
            label: "Term 1 (EL1008) (6)".into(),
            reason: EngineError::new("0x98110035: item is locked").message,
        };
        assert_eq!(
            err.to_string(),
            "Error setting device state of 'Term 1 (EL1008) (6)': 0x98110035: item is locked"
        );
    }

    #[test]
    fn test_from_owner_error() {
        let err: SessionError = OwnerError::Disconnected.into();
        assert!(matches!(
            err,
            SessionError::OwnerUnavailable(OwnerError::Disconnected)
        ));
    }
}
