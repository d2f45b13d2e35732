//! Mod loader ecosystems supported by the game extension
//!
//! Schedule 1 can be modded through two unrelated loaders. Everything that
//! is specific to one of them (folder names, presence signature, release
//! feed, content markers) hangs off [`Ecosystem`] so the classifier,
//! sniffer and bootstrap code share one vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A mod loader ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// BepInEx plugin loader (patchers + plugins)
    BepInEx,
    /// MelonLoader script injection loader (mods + plugins)
    MelonLoader,
}

impl Ecosystem {
    /// All ecosystems, in the order they are checked
    pub const ALL: [Ecosystem; 2] = [Ecosystem::BepInEx, Ecosystem::MelonLoader];

    /// Human readable loader name, also used as the installed mod name
    pub fn display_name(self) -> &'static str {
        match self {
            Ecosystem::BepInEx => "BepInEx",
            Ecosystem::MelonLoader => "MelonLoader",
        }
    }

    /// Loader root folder relative to the game directory
    pub fn root_dir(self) -> &'static str {
        match self {
            Ecosystem::BepInEx => crate::install::paths::BEPINEX_ROOT,
            Ecosystem::MelonLoader => crate::install::paths::MELONLOADER_ROOT,
        }
    }

    /// File whose existence proves the loader is installed, relative to the game directory
    pub fn signature_file(self) -> &'static [&'static str] {
        match self {
            Ecosystem::BepInEx => &["bepinex", "core", "BepInEx.dll"],
            Ecosystem::MelonLoader => &["MelonLoader", "net6", "MelonLoader.dll"],
        }
    }

    /// Absolute path of the presence signature for a game installation
    pub fn signature_path(self, game_dir: &Path) -> PathBuf {
        self.signature_file()
            .iter()
            .fold(game_dir.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Latest-release endpoint of the loader's GitHub repository
    pub fn default_feed_url(self) -> &'static str {
        match self {
            Ecosystem::BepInEx => "https://api.github.com/repos/BepInEx/BepInEx/releases/latest",
            Ecosystem::MelonLoader => {
                "https://api.github.com/repos/LavaGang/MelonLoader/releases/latest"
            }
        }
    }

    /// Substring identifying the Windows x64 asset of a release
    pub fn asset_token(self) -> &'static str {
        match self {
            Ecosystem::BepInEx => "BepInEx_win_x64",
            Ecosystem::MelonLoader => "MelonLoader.x64.zip",
        }
    }

    /// Identifier of the "installing loader" activity notification
    pub fn activity_notification_id(self) -> String {
        format!(
            "{}-installing{}",
            crate::game::GAME_ID,
            self.display_name().to_lowercase()
        )
    }

    /// Parse a loader name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bepinex" => Some(Ecosystem::BepInEx),
            "melonloader" | "melon" => Some(Ecosystem::MelonLoader),
            _ => None,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
