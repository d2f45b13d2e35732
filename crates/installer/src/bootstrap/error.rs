//! Error types for loader bootstrapping

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Release {tag} has no assets")]
    NoAssets { tag: String },

    #[error("No release asset matches '{token}'")]
    AssetNotFound { token: String },

    #[error("Importing {} produced no download", path.display())]
    ImportFailed { path: PathBuf },

    #[error("Installing download {download_id} failed: {reason}")]
    InstallFailed { download_id: String, reason: String },

    #[error("Mod pipeline error: {0}")]
    Pipeline(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

impl BootstrapError {
    /// Get error category for logs
    pub fn category(&self) -> &'static str {
        match self {
            BootstrapError::Http(_) => "http",
            BootstrapError::Io(_) => "io",
            BootstrapError::InvalidUrl(_) => "url",
            BootstrapError::NoAssets { .. } => "no_assets",
            BootstrapError::AssetNotFound { .. } => "asset_not_found",
            BootstrapError::ImportFailed { .. } => "import",
            BootstrapError::InstallFailed { .. } => "install",
            BootstrapError::Pipeline(_) => "pipeline",
        }
    }
}
