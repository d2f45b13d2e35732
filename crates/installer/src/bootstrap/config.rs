//! Configuration for loader bootstrapping

use std::path::PathBuf;

use crate::ecosystem::Ecosystem;

/// Where loader releases are fetched from and where downloads land
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub bepinex_feed: String,
    pub melonloader_feed: String,
    /// GitHub rejects API requests without a user agent
    pub user_agent: String,
    /// Downloads are written here before being handed to the host
    pub temp_dir: PathBuf,
}

impl BootstrapConfig {
    pub fn feed_url(&self, ecosystem: Ecosystem) -> &str {
        match ecosystem {
            Ecosystem::BepInEx => &self.bepinex_feed,
            Ecosystem::MelonLoader => &self.melonloader_feed,
        }
    }

    pub fn with_feed_url<S: Into<String>>(mut self, ecosystem: Ecosystem, url: S) -> Self {
        match ecosystem {
            Ecosystem::BepInEx => self.bepinex_feed = url.into(),
            Ecosystem::MelonLoader => self.melonloader_feed = url.into(),
        }
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, temp_dir: P) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            bepinex_feed: Ecosystem::BepInEx.default_feed_url().to_string(),
            melonloader_feed: Ecosystem::MelonLoader.default_feed_url().to_string(),
            user_agent: concat!("s1-installer/", env!("CARGO_PKG_VERSION")).to_string(),
            temp_dir: std::env::temp_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_github() {
        let config = BootstrapConfig::default();
        assert!(config.feed_url(Ecosystem::BepInEx).contains("BepInEx/BepInEx"));
        assert!(config.feed_url(Ecosystem::MelonLoader).contains("LavaGang/MelonLoader"));
        assert!(config.user_agent.starts_with("s1-installer/"));
    }

    #[test]
    fn feed_override_only_touches_one_loader() {
        let config = BootstrapConfig::default().with_feed_url(Ecosystem::MelonLoader, "http://localhost/ml");
        assert_eq!(config.feed_url(Ecosystem::MelonLoader), "http://localhost/ml");
        assert_eq!(
            config.feed_url(Ecosystem::BepInEx),
            Ecosystem::BepInEx.default_feed_url()
        );
    }
}
