//! Steam library discovery
//!
//! Steam keeps a list of library folders in `steamapps/libraryfolders.vdf`
//! below its install root, and one `appmanifest_<appid>.acf` per installed
//! app inside each library. Both are KeyValues text files; only the quoted
//! `"key" "value"` pairs matter here.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

/// Finds apps installed through Steam
#[derive(Debug, Clone, Default)]
pub struct SteamLocator {
    roots: Vec<PathBuf>,
}

impl SteamLocator {
    /// Locator over explicit Steam install roots
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Locator over the Steam roots of this machine
    pub fn discover() -> Self {
        Self::with_roots(default_steam_roots())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Library folders of every root, roots first, without duplicates
    pub async fn libraries(&self) -> Vec<PathBuf> {
        let mut libraries: Vec<PathBuf> = Vec::new();
        for root in &self.roots {
            let mut found = vec![root.clone()];
            let vdf = root.join("steamapps").join("libraryfolders.vdf");
            if let Ok(content) = fs::read_to_string(&vdf).await {
                found.extend(
                    key_values(&content)
                        .filter(|(key, _)| key.eq_ignore_ascii_case("path"))
                        .map(|(_, value)| PathBuf::from(value)),
                );
            }
            for library in found {
                if !libraries.contains(&library) {
                    libraries.push(library);
                }
            }
        }
        libraries
    }

    /// Install directory of `app_id`, if any library has it
    pub async fn find_app(&self, app_id: u32) -> Option<PathBuf> {
        for library in self.libraries().await {
            let steamapps = library.join("steamapps");
            let manifest = steamapps.join(format!("appmanifest_{app_id}.acf"));
            let Ok(content) = fs::read_to_string(&manifest).await else {
                continue;
            };

            let Some(install_dir) = key_values(&content)
                .find(|(key, _)| key.eq_ignore_ascii_case("installdir"))
                .map(|(_, value)| value)
            else {
                debug!("{} has no installdir", manifest.display());
                continue;
            };

            let path = steamapps.join("common").join(install_dir);
            if is_dir(&path).await {
                debug!("Found app {} in {}", app_id, path.display());
                return Some(path);
            }
        }
        None
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// Quoted `"key" "value"` pairs of a KeyValues document, in order
pub(crate) fn key_values(content: &str) -> impl Iterator<Item = (String, String)> + '_ {
    content.lines().filter_map(|line| {
        let mut tokens = quoted_tokens(line.trim());
        let key = tokens.next()?;
        let value = tokens.next()?;
        Some((key, value))
    })
}

fn quoted_tokens(line: &str) -> impl Iterator<Item = String> + '_ {
    let mut chars = line.chars();
    std::iter::from_fn(move || {
        chars.by_ref().find(|&c| c == '"')?;
        let mut token = String::new();
        while let Some(c) = chars.next() {
            match c {
                '"' => return Some(token),
                '\\' => token.push(chars.next().unwrap_or('\\')),
                _ => token.push(c),
            }
        }
        None
    })
}

#[cfg(windows)]
fn default_steam_roots() -> Vec<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::*;

    let mut roots = Vec::new();
    let lookups = [
        (HKEY_CURRENT_USER, r"Software\Valve\Steam", "SteamPath"),
        (HKEY_LOCAL_MACHINE, r"SOFTWARE\WOW6432Node\Valve\Steam", "InstallPath"),
        (HKEY_LOCAL_MACHINE, r"SOFTWARE\Valve\Steam", "InstallPath"),
    ];
    for (hive, key, value) in lookups {
        if let Ok(key) = RegKey::predef(hive).open_subkey(key) {
            if let Ok(path) = key.get_value::<String, _>(value) {
                let path = PathBuf::from(path);
                if !roots.contains(&path) {
                    roots.push(path);
                }
            }
        }
    }

    if let Ok(program_files) = std::env::var("PROGRAMFILES(X86)") {
        roots.push(PathBuf::from(program_files).join("Steam"));
    }
    roots
}

#[cfg(not(windows))]
fn default_steam_roots() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    vec![
        home.join(".steam").join("steam"),
        home.join(".local").join("share").join("Steam"),
        home.join("Library").join("Application Support").join("Steam"),
    ]
}
