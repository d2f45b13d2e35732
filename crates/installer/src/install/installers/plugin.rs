//! BepInEx and MelonLoader native plugins
//!
//! Runs in two passes. The sniffing pass reads every `.dll` concurrently to
//! learn which loader the archive targets; package level checks (mixed
//! loaders, missing loader) run on that result. The resolution pass then
//! routes each file and the variant check runs on the finished plan.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::{Instrument, debug, info, info_span, warn};

use super::{
    InstallProgress, InstallRequest, InstallResult, ModInstaller, Result, SupportResult,
    ensure_game, stat_entries,
};
use crate::bootstrap::LoaderBootstrapper;
use crate::ecosystem::Ecosystem;
use crate::game::GAME_ID;
use crate::install::error::{CancelReason, InstallError};
use crate::install::host::{Choice, InstallHost, Notification, Prompt};
use crate::install::paths::{BINARY_PLUGIN_EXTENSION, SegmentedPath};
use crate::install::policy::{Decision, evaluate_resolved, evaluate_sniffed};
use crate::install::resolver::{ModShape, plan};
use crate::install::sniffer::{ContentSniffer, MarkerSniffer, sniff_archive};

/// File names that mark an archive as a loader distribution rather than a mod
const LOADER_FILES: &[&str] = &["bepinex.dll", "melonloader.dll"];

pub struct PluginInstaller {
    host: Arc<dyn InstallHost>,
    sniffer: Arc<dyn ContentSniffer>,
    bootstrapper: Option<Arc<dyn LoaderBootstrapper>>,
    game_path: Option<PathBuf>,
}

impl PluginInstaller {
    pub const ID: &'static str = "schedule1-pluginmod";

    pub fn new(host: Arc<dyn InstallHost>) -> Self {
        Self {
            host,
            sniffer: Arc::new(MarkerSniffer::default()),
            bootstrapper: None,
            game_path: None,
        }
    }

    pub fn with_sniffer(mut self, sniffer: Arc<dyn ContentSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    pub fn with_bootstrapper(mut self, bootstrapper: Arc<dyn LoaderBootstrapper>) -> Self {
        self.bootstrapper = Some(bootstrapper);
        self
    }

    /// Game installation checked for loader presence
    pub fn with_game_path<P: Into<PathBuf>>(mut self, game_path: P) -> Self {
        self.game_path = Some(game_path.into());
        self
    }

    /// Loaders whose presence signature exists in the game directory.
    ///
    /// Without a known game directory every loader counts as missing.
    async fn installed_loaders(&self) -> BTreeSet<Ecosystem> {
        let mut installed = BTreeSet::new();
        let Some(ref game_path) = self.game_path else {
            return installed;
        };

        for ecosystem in Ecosystem::ALL {
            let signature = ecosystem.signature_path(game_path);
            if fs::try_exists(&signature).await.unwrap_or(false) {
                installed.insert(ecosystem);
            }
        }
        installed
    }

    async fn ask(&self, decision: &Decision, request: &InstallRequest) -> Choice {
        let prompt = Prompt::for_decision(decision);
        if request.unattended {
            debug!("Unattended install, answering '{}' with {:?}", prompt.title, prompt.unattended);
            return prompt.unattended;
        }
        self.host.confirm(&prompt).await
    }

    async fn bootstrap(&self, ecosystem: Ecosystem) -> Result<()> {
        let Some(ref bootstrapper) = self.bootstrapper else {
            warn!("No loader bootstrapper configured, not fetching {}", ecosystem);
            return Ok(());
        };

        let activity = ecosystem.activity_notification_id();
        self.host
            .notify(Notification::activity(activity.clone(), format!("Downloading {ecosystem}")));
        let result = bootstrapper.bootstrap(ecosystem).await;
        self.host.dismiss(&activity);

        let installed = result?;
        info!("{} {} installed as {}", ecosystem, installed.version, installed.mod_id);
        Ok(())
    }

    async fn run(&self, request: &InstallRequest) -> Result<InstallResult> {
        ensure_game(&request.game_id)?;
        request.report(InstallProgress::Started {
            installer: Self::ID,
            files: request.files.len(),
        });

        let (entries, mut failures) = stat_entries(self.host.as_ref(), request).await;
        let files: Vec<String> = entries
            .iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| entry.path.clone())
            .collect();

        let report = sniff_archive(self.sniffer.as_ref(), &request.working_dir, &files).await;
        for failure in &report.failures {
            self.host.notify(Notification::file_error(failure));
        }
        failures.extend(report.failures);
        let facts = report.facts;
        debug!("Archive loaders: {:?}", facts.ecosystems());

        let installed = self.installed_loaders().await;
        for decision in evaluate_sniffed(&facts, &installed) {
            match decision {
                Decision::MixedEcosystems => {
                    // acknowledgement only, the package cannot be installed
                    self.ask(&decision, request).await;
                    return Err(InstallError::Cancelled(CancelReason::MixedEcosystems));
                }
                Decision::MissingLoader(ecosystem) => {
                    if self.ask(&decision, request).await == Choice::Confirm {
                        self.bootstrap(ecosystem).await?;
                    }
                }
                Decision::VariantConflict { .. } => {}
            }
        }

        let plan = plan(ModShape::NativePlugin, &entries, &facts);
        if let Some(decision) = evaluate_resolved(&plan.variants) {
            if self.ask(&decision, request).await == Choice::Confirm {
                return Err(InstallError::Cancelled(CancelReason::VariantPackage));
            }
            warn!("Installing package with {} variants", plan.variants.len());
            self.host.notify(Notification::variant_warning());
        }

        debug!(
            "{} instructions, {} files dropped",
            plan.instructions.len(),
            plan.dropped.len()
        );
        request.report(InstallProgress::Finished {
            instructions: plan.instructions.len(),
        });
        Ok(InstallResult {
            instructions: plan.instructions,
            failures,
        })
    }
}

#[async_trait]
impl ModInstaller for PluginInstaller {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn priority(&self) -> u32 {
        27
    }

    fn test(&self, files: &[String], game_id: &str) -> SupportResult {
        let has_plugin = files
            .iter()
            .any(|file| SegmentedPath::new(file).has_extension(BINARY_PLUGIN_EXTENSION));
        let has_loader = files.iter().any(|file| {
            let lowered = file.to_lowercase();
            LOADER_FILES.iter().any(|name| lowered.contains(name))
        });

        SupportResult::supported(game_id == GAME_ID && has_plugin && !has_loader)
    }

    async fn install(&self, request: &InstallRequest) -> Result<InstallResult> {
        self.run(request)
            .instrument(info_span!("plugin_install", files = request.files.len()))
            .await
    }
}
