//! S1API loader packages

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    InstallRequest, InstallResult, ModInstaller, Result, SupportResult, any_file_named,
    install_layout,
};
use crate::game::GAME_ID;
use crate::install::host::InstallHost;
use crate::install::resolver::ModShape;

/// Installs the S1API loader, keeping its `plugins/` tree
pub struct ApiLoaderInstaller {
    host: Arc<dyn InstallHost>,
}

impl ApiLoaderInstaller {
    pub const ID: &'static str = "schedule1-s1api";
    const MARKER_FILE: &'static str = "s1apiloader.dll";

    pub fn new(host: Arc<dyn InstallHost>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl ModInstaller for ApiLoaderInstaller {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn priority(&self) -> u32 {
        25
    }

    fn test(&self, files: &[String], game_id: &str) -> SupportResult {
        SupportResult::supported(game_id == GAME_ID && any_file_named(files, Self::MARKER_FILE))
    }

    async fn install(&self, request: &InstallRequest) -> Result<InstallResult> {
        install_layout(Self::ID, ModShape::ApiLoader, self.host.as_ref(), request).await
    }
}
