//! GitHub release metadata

use serde::Deserialize;

use super::error::{BootstrapError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release {
    /// First asset whose name contains `token`
    pub fn find_asset(&self, token: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name.contains(token))
    }

    pub fn select_asset(&self, token: &str) -> Result<&ReleaseAsset> {
        if self.assets.is_empty() {
            return Err(BootstrapError::NoAssets {
                tag: self.tag_name.clone(),
            });
        }
        self.find_asset(token).ok_or_else(|| BootstrapError::AssetNotFound {
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(names: &[&str]) -> Release {
        Release {
            tag_name: "v6.0.0".to_string(),
            assets: names
                .iter()
                .map(|name| ReleaseAsset {
                    name: name.to_string(),
                    browser_download_url: format!("https://example.com/{name}"),
                })
                .collect(),
        }
    }

    #[test]
    fn picks_first_matching_asset() {
        let release = release(&[
            "BepInEx_linux_x64_5.4.23.zip",
            "BepInEx_win_x64_5.4.23.zip",
            "BepInEx_win_x64_5.4.23.zip.sha256",
        ]);
        let asset = release.select_asset("BepInEx_win_x64").unwrap();
        assert_eq!(asset.name, "BepInEx_win_x64_5.4.23.zip");
    }

    #[test]
    fn empty_and_unmatched_releases() {
        assert!(matches!(
            release(&[]).select_asset("x"),
            Err(BootstrapError::NoAssets { .. })
        ));
        assert!(matches!(
            release(&["MelonLoader.x86.zip"]).select_asset("MelonLoader.x64.zip"),
            Err(BootstrapError::AssetNotFound { .. })
        ));
    }

    #[test]
    fn deserializes_github_payload() {
        let json = r#"{
            "tag_name": "v0.7.0",
            "name": "v0.7.0 Open-Beta",
            "assets": [
                {"name": "MelonLoader.x64.zip", "size": 1, "browser_download_url": "https://example.com/ml.zip"}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v0.7.0");
        assert_eq!(release.assets[0].browser_download_url, "https://example.com/ml.zip");
    }
}
