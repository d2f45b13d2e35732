//! Installer registry
//!
//! Keeps the registered installers and picks the one that handles an
//! archive. Installers are tried by ascending priority; installers with the
//! same priority keep their registration order.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::bootstrap::LoaderBootstrapper;
use crate::install::host::InstallHost;
use crate::install::installers::{
    ApiLoaderInstaller, InstallRequest, InstallResult, LuaScriptInstaller, ModInstaller,
    PluginInstaller, Result, ScriptLoaderInstaller,
};

#[derive(Default)]
pub struct InstallerRegistry {
    installers: Vec<Box<dyn ModInstaller>>,
}

impl InstallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an installer; chains like a builder
    pub fn register<I: ModInstaller + 'static>(mut self, installer: I) -> Self {
        self.installers.push(Box::new(installer));
        // stable sort keeps registration order among equal priorities
        self.installers.sort_by_key(|installer| installer.priority());
        self
    }

    /// Every installer shipped for the game
    pub fn schedule_one(
        host: Arc<dyn InstallHost>,
        bootstrapper: Option<Arc<dyn LoaderBootstrapper>>,
        game_path: Option<PathBuf>,
    ) -> Self {
        let mut plugin = PluginInstaller::new(host.clone());
        if let Some(bootstrapper) = bootstrapper {
            plugin = plugin.with_bootstrapper(bootstrapper);
        }
        if let Some(game_path) = game_path {
            plugin = plugin.with_game_path(game_path);
        }

        Self::new()
            .register(ScriptLoaderInstaller::new(host.clone()))
            .register(LuaScriptInstaller::new(host.clone()))
            .register(ApiLoaderInstaller::new(host))
            .register(plugin)
    }

    pub fn len(&self) -> usize {
        self.installers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }

    /// Installer ids in the order they are tried
    pub fn ids(&self) -> Vec<&'static str> {
        self.installers.iter().map(|installer| installer.id()).collect()
    }

    /// First installer reporting support for the archive
    pub fn find_installer(&self, files: &[String], game_id: &str) -> Option<&dyn ModInstaller> {
        self.installers
            .iter()
            .find(|installer| installer.test(files, game_id).supported)
            .map(|installer| installer.as_ref())
    }

    /// Pick an installer and run it; `None` when no installer applies
    pub async fn install(&self, request: &InstallRequest) -> Option<Result<InstallResult>> {
        let installer = self.find_installer(&request.files, &request.game_id)?;
        debug!("Installing with {}", installer.id());
        Some(installer.install(request).await)
    }
}
