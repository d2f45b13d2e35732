//! Loader bootstrap
//!
//! Fetches the latest release of a mod loader from its GitHub feed,
//! downloads the Windows x64 asset and hands it to the host pipeline, which
//! imports, installs and enables it. The installed mod is only tagged after
//! the host reports a successful install.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod release;

pub use config::BootstrapConfig;
pub use error::{BootstrapError, Result};
pub use pipeline::{ModAction, ModAttributes, ModPipeline};
pub use release::{Release, ReleaseAsset};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::ecosystem::Ecosystem;

/// A loader archive downloaded to local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedLoader {
    pub ecosystem: Ecosystem,
    /// Release tag the asset belongs to
    pub version: String,
    pub path: PathBuf,
}

/// A loader installed and enabled through the host pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledLoader {
    pub ecosystem: Ecosystem,
    pub mod_id: String,
    pub version: String,
}

/// Installs a missing loader on request of an installer
#[async_trait]
pub trait LoaderBootstrapper: Send + Sync {
    async fn bootstrap(&self, ecosystem: Ecosystem) -> Result<InstalledLoader>;
}

/// Client for loader release feeds
pub struct ReleaseClient {
    client: Client,
    config: BootstrapConfig,
}

impl ReleaseClient {
    pub fn new(config: BootstrapConfig) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Latest release metadata of a loader
    pub async fn fetch_release(&self, ecosystem: Ecosystem) -> Result<Release> {
        let url = url::Url::parse(self.config.feed_url(ecosystem))?;
        debug!("Fetching release feed {}", url);

        let response = self.client.get(url).send().await?;
        let release = response.error_for_status()?.json::<Release>().await?;
        debug!("Latest {} release is {}", ecosystem, release.tag_name);
        Ok(release)
    }

    /// Stream an asset into `dest_dir`, returning the final file path.
    ///
    /// Data goes to a `.part` file first and is renamed once complete, so a
    /// failed transfer never leaves a file under the final name.
    pub async fn download_asset(&self, asset: &ReleaseAsset, dest_dir: &Path) -> Result<PathBuf> {
        let url = url::Url::parse(&asset.browser_download_url)?;
        let file_name = Path::new(&asset.name)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "loader.zip".into());
        let dest_path = dest_dir.join(&file_name);
        let mut temp_name = file_name;
        temp_name.push(".part");
        let temp_path = dest_dir.join(temp_name);

        fs::create_dir_all(dest_dir).await?;
        let response = self.client.get(url).send().await?.error_for_status()?;

        let file = fs::File::create(&temp_path).await?;
        let downloaded = write_part(file, &temp_path, response).await?;

        fs::rename(&temp_path, &dest_path).await?;
        debug!("Downloaded {} bytes to {}", downloaded, dest_path.display());
        Ok(dest_path)
    }

    /// Fetch the latest release and download its platform asset
    pub async fn fetch_loader(&self, ecosystem: Ecosystem, dest_dir: &Path) -> Result<DownloadedLoader> {
        let release = self.fetch_release(ecosystem).await?;
        let asset = release.select_asset(ecosystem.asset_token())?;
        let path = self.download_asset(asset, dest_dir).await?;

        Ok(DownloadedLoader {
            ecosystem,
            version: release.tag_name,
            path,
        })
    }
}

/// Write a response body into an open `.part` file, removing the file on
/// any stream or write error
async fn write_part(mut file: fs::File, temp_path: &Path, response: reqwest::Response) -> Result<u64> {
    let written = write_stream(&mut file, response).await;
    drop(file);
    if written.is_err() {
        let _ = fs::remove_file(temp_path).await;
    }
    written
}

async fn write_stream(file: &mut fs::File, response: reqwest::Response) -> Result<u64> {
    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(downloaded)
}

/// Bootstrapper backed by the GitHub feeds and a host [`ModPipeline`]
pub struct LoaderBootstrap {
    releases: ReleaseClient,
    pipeline: Arc<dyn ModPipeline>,
}

impl LoaderBootstrap {
    pub fn new(config: BootstrapConfig, pipeline: Arc<dyn ModPipeline>) -> Result<Self> {
        Ok(Self {
            releases: ReleaseClient::new(config)?,
            pipeline,
        })
    }

    async fn run(&self, ecosystem: Ecosystem) -> Result<InstalledLoader> {
        let temp_dir = self.releases.config().temp_dir.clone();
        let downloaded = self.releases.fetch_loader(ecosystem, &temp_dir).await?;

        let download_ids = self.pipeline.import(std::slice::from_ref(&downloaded.path)).await?;
        let Some(download_id) = download_ids.into_iter().next() else {
            return Err(BootstrapError::ImportFailed {
                path: downloaded.path,
            });
        };

        let mod_id = self
            .pipeline
            .start_install(&download_id, true)
            .await
            .map_err(|e| BootstrapError::InstallFailed {
                download_id: download_id.clone(),
                reason: format!("{e:#}"),
            })?;

        let attributes = ModAttributes {
            name: ecosystem.display_name().to_string(),
            custom_file_name: ecosystem.display_name().to_string(),
            version: downloaded.version.clone(),
            install_time: SystemTime::now(),
        };
        let mut actions = vec![ModAction::SetAttributes {
            mod_id: mod_id.clone(),
            attributes: attributes.to_value(),
        }];
        match self.pipeline.active_profile() {
            Some(profile_id) => actions.push(ModAction::SetEnabled {
                profile_id,
                mod_id: mod_id.clone(),
                enabled: true,
            }),
            None => warn!("No active profile, {} installed but not enabled", ecosystem),
        }
        self.pipeline.apply(actions).await?;

        info!("Installed {} {} as mod {}", ecosystem, downloaded.version, mod_id);
        Ok(InstalledLoader {
            ecosystem,
            mod_id,
            version: downloaded.version,
        })
    }
}

#[async_trait]
impl LoaderBootstrapper for LoaderBootstrap {
    async fn bootstrap(&self, ecosystem: Ecosystem) -> Result<InstalledLoader> {
        self.run(ecosystem)
            .instrument(info_span!("loader_bootstrap", loader = %ecosystem))
            .await
    }
}
