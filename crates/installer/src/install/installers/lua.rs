//! Loose Lua scripts for the ScheduleLua loader

use std::sync::Arc;

use async_trait::async_trait;

use super::{InstallRequest, InstallResult, ModInstaller, Result, SupportResult, install_layout};
use crate::game::GAME_ID;
use crate::install::host::InstallHost;
use crate::install::paths::{LUA_EXTENSION, SegmentedPath};
use crate::install::resolver::ModShape;

/// Flattens every `.lua` file into the ScheduleLua scripts folder
pub struct LuaScriptInstaller {
    host: Arc<dyn InstallHost>,
}

impl LuaScriptInstaller {
    pub const ID: &'static str = "schedule1-luamod";

    pub fn new(host: Arc<dyn InstallHost>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl ModInstaller for LuaScriptInstaller {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn priority(&self) -> u32 {
        25
    }

    fn test(&self, files: &[String], game_id: &str) -> SupportResult {
        let has_script = files
            .iter()
            .any(|file| SegmentedPath::new(file).has_extension(LUA_EXTENSION));
        SupportResult::supported(game_id == GAME_ID && has_script)
    }

    async fn install(&self, request: &InstallRequest) -> Result<InstallResult> {
        install_layout(Self::ID, ModShape::LuaScript, self.host.as_ref(), request).await
    }
}
