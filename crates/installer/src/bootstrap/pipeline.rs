//! Host download and install pipeline

use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use serde_json::{Value, json};

/// A state change applied to the host's mod store
#[derive(Debug, Clone, PartialEq)]
pub enum ModAction {
    SetAttributes { mod_id: String, attributes: Value },
    SetEnabled { profile_id: String, mod_id: String, enabled: bool },
}

/// Attributes tagged onto a freshly installed loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModAttributes {
    pub name: String,
    pub custom_file_name: String,
    pub version: String,
    pub install_time: SystemTime,
}

impl ModAttributes {
    pub fn to_value(&self) -> Value {
        let install_time = self
            .install_time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        json!({
            "name": self.name,
            "customFileName": self.custom_file_name,
            "version": self.version,
            "installTime": install_time,
        })
    }
}

/// The host side of importing and installing a downloaded archive
#[async_trait]
pub trait ModPipeline: Send + Sync {
    /// Register local archives as downloads, returning their ids
    async fn import(&self, paths: &[PathBuf]) -> anyhow::Result<Vec<String>>;

    /// Install a download, returning the new mod id
    async fn start_install(&self, download_id: &str, allow_overwrite: bool) -> anyhow::Result<String>;

    /// Profile that newly installed mods are enabled in
    fn active_profile(&self) -> Option<String>;

    /// Apply the actions as one batch
    async fn apply(&self, actions: Vec<ModAction>) -> anyhow::Result<()>;
}
