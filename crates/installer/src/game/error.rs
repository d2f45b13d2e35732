//! Game discovery and setup errors

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Could not locate {game}: {suggestion}")]
    NotFound { game: String, suggestion: String },

    #[error("{} is not a {game} installation", path.display())]
    NotAnInstallation { game: String, path: PathBuf },

    #[error("Failed to prepare {}: {source}", path.display())]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GameError>;
