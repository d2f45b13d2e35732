//! Game registration
//!
//! Static description of Schedule 1, discovery of its installation and the
//! setup hook that readies the loader folders before the first deployment.

pub mod error;
pub mod steam;

pub use error::{GameError, Result};
pub use steam::SteamLocator;

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tokio::fs;
use tracing::{debug, info};

use crate::install::paths::{BEPINEX_ROOT, MELONLOADER_MODS, MELONLOADER_ROOT};

/// Host identifier of the game
pub const GAME_ID: &str = "schedule1";

/// Environment variable overriding installation discovery
pub const GAME_PATH_ENV: &str = "S1_GAME_PATH";

/// What the host needs to know to register a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub executable: &'static str,
    /// Files that must exist for a directory to be this game
    pub required_files: &'static [&'static str],
    pub steam_app_id: u32,
    /// Folders below the game root that mods are deployed into
    pub mod_dirs: &'static [&'static str],
}

pub const SCHEDULE_ONE: GameDefinition = GameDefinition {
    id: GAME_ID,
    name: "Schedule 1",
    executable: "Schedule I.exe",
    required_files: &["Schedule I.exe"],
    steam_app_id: 3164500,
    mod_dirs: &[BEPINEX_ROOT, MELONLOADER_MODS, MELONLOADER_ROOT],
};

impl GameDefinition {
    /// Whether every required file exists below `dir`
    pub async fn is_installation(&self, dir: &Path) -> bool {
        for file in self.required_files {
            if !fs::try_exists(dir.join(file)).await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    /// Locate the game, preferring `S1_GAME_PATH` over Steam. Either way the
    /// directory must contain the game executable.
    pub async fn find_installation(&self, steam: &SteamLocator) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(GAME_PATH_ENV) {
            let path = PathBuf::from(path);
            if self.is_installation(&path).await {
                debug!("Found game via environment variable: {}", path.display());
                return Ok(path);
            }
            return Err(GameError::NotAnInstallation {
                game: self.name.to_string(),
                path,
            });
        }

        match steam.find_app(self.steam_app_id).await {
            Some(path) if self.is_installation(&path).await => {
                info!("Found {} at {}", self.name, path.display());
                Ok(path)
            }
            Some(path) => Err(GameError::NotAnInstallation {
                game: self.name.to_string(),
                path,
            }),
            None => Err(GameError::NotFound {
                game: self.name.to_string(),
                suggestion: format!(
                    "install it through Steam or set {GAME_PATH_ENV} to the game directory"
                ),
            }),
        }
    }

    /// Make sure every mod folder exists and accepts writes.
    ///
    /// All folders are prepared concurrently; the first failure fails the
    /// whole setup.
    pub async fn prepare_for_modding(&self, game_dir: &Path) -> Result<()> {
        let results = join_all(
            self.mod_dirs
                .iter()
                .map(|dir| ensure_dir_writable(game_dir.join(dir))),
        )
        .await;

        results.into_iter().collect::<Result<Vec<_>>>()?;
        debug!("Prepared {} for modding", game_dir.display());
        Ok(())
    }
}

async fn ensure_dir_writable(path: PathBuf) -> Result<()> {
    let prepare = async {
        fs::create_dir_all(&path).await?;
        let probe = path.join(".s1-write-probe");
        fs::write(&probe, b"").await?;
        fs::remove_file(&probe).await
    };

    let result = prepare.await;
    result.map_err(|source| GameError::PrepareFailed { path, source })
}
