//! Installation error types

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::bootstrap::BootstrapError;

/// Why the user aborted an installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The archive contains both BepInEx and MelonLoader content
    MixedEcosystems,
    /// The archive offers several alternative copies of the mod
    VariantPackage,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::MixedEcosystems => f.write_str("archive mixes BepInEx and MelonLoader mods"),
            CancelReason::VariantPackage => f.write_str("archive contains several mod variants"),
        }
    }
}

/// Errors that can occur during installation
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// User-confirmed abort; hosts treat this as a normal user action
    #[error("Installation cancelled: {0}")]
    Cancelled(CancelReason),

    #[error("Game '{game_id}' is not handled by this installer")]
    UnsupportedGame { game_id: String },

    #[error("Loader bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),
}

impl InstallError {
    /// Whether the error only records a user decision
    pub fn is_user_cancellation(&self) -> bool {
        matches!(self, InstallError::Cancelled(_))
    }
}

/// Which filesystem operation failed on an archive entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Stat,
    Read,
}

/// A per-file error that did not stop the installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub operation: FileOperation,
    pub message: String,
}

impl FileFailure {
    pub fn stat(path: &str, error: &std::io::Error) -> Self {
        Self {
            path: path.to_string(),
            operation: FileOperation::Stat,
            message: error.to_string(),
        }
    }

    pub fn read(path: &str, error: &std::io::Error) -> Self {
        Self {
            path: path.to_string(),
            operation: FileOperation::Read,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operation {
            FileOperation::Stat => "reading stats for",
            FileOperation::Read => "reading",
        };
        write!(f, "error while {} {}: {}", op, self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancellation_is_user_action() {
        assert!(InstallError::Cancelled(CancelReason::VariantPackage).is_user_cancellation());
        let io = InstallError::from(std::io::Error::other("boom"));
        assert!(!io.is_user_cancellation());
    }

    #[test]
    fn failure_display_names_the_file() {
        let failure = FileFailure::stat("Mod/a.dll", &std::io::Error::other("denied"));
        assert_eq!(failure.to_string(), "error while reading stats for Mod/a.dll: denied");
    }
}
