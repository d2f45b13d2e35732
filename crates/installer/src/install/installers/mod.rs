//! Archive installers
//!
//! Each installer decides whether it can handle an archive (`test`) and
//! turns the staged extraction into copy instructions (`install`). The host
//! tries installers in priority order through the
//! [`InstallerRegistry`](crate::install::registry::InstallerRegistry).

mod lua;
mod plugin;
mod s1api;
mod schedule_lua;

pub use lua::LuaScriptInstaller;
pub use plugin::PluginInstaller;
pub use s1api::ApiLoaderInstaller;
pub use schedule_lua::ScriptLoaderInstaller;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

use crate::game::GAME_ID;
use crate::install::error::{FileFailure, InstallError};
use crate::install::host::{InstallHost, Notification};
use crate::install::paths::{ArchiveEntry, SegmentedPath};
use crate::install::policy::ArchiveFacts;
use crate::install::resolver::{CopyInstruction, ModShape, plan};

pub type Result<T> = std::result::Result<T, InstallError>;

/// Progress events reported while an installer runs
#[derive(Debug, Clone, PartialEq)]
pub enum InstallProgress {
    Started { installer: &'static str, files: usize },
    /// Fraction of entries processed, 0.0 to 1.0
    Progress { fraction: f64 },
    Finished { instructions: usize },
}

pub type ProgressCallback = Arc<dyn Fn(InstallProgress) + Send + Sync>;

/// Answer to an installer's `test`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResult {
    pub supported: bool,
    pub required_files: Vec<String>,
}

impl SupportResult {
    pub fn supported(supported: bool) -> Self {
        Self {
            supported,
            required_files: Vec::new(),
        }
    }
}

/// Everything an installer gets from the host for one archive
#[derive(Clone)]
pub struct InstallRequest {
    /// Archive entries relative to `working_dir`
    pub files: Vec<String>,
    /// Root of the staged extraction
    pub working_dir: PathBuf,
    pub game_id: String,
    /// No user is present; prompts take their unattended answer
    pub unattended: bool,
    pub archive_path: Option<PathBuf>,
    pub progress: Option<ProgressCallback>,
}

impl InstallRequest {
    pub fn new<P: Into<PathBuf>>(files: Vec<String>, working_dir: P) -> Self {
        Self {
            files,
            working_dir: working_dir.into(),
            game_id: GAME_ID.to_string(),
            unattended: false,
            archive_path: None,
            progress: None,
        }
    }

    pub fn with_game_id<S: Into<String>>(mut self, game_id: S) -> Self {
        self.game_id = game_id.into();
        self
    }

    pub fn with_unattended(mut self, unattended: bool) -> Self {
        self.unattended = unattended;
        self
    }

    pub fn with_archive_path<P: Into<PathBuf>>(mut self, archive_path: P) -> Self {
        self.archive_path = Some(archive_path.into());
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub(crate) fn report(&self, event: InstallProgress) {
        if let Some(ref callback) = self.progress {
            callback(event);
        }
    }
}

impl std::fmt::Debug for InstallRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallRequest")
            .field("files", &self.files.len())
            .field("working_dir", &self.working_dir)
            .field("game_id", &self.game_id)
            .field("unattended", &self.unattended)
            .field("archive_path", &self.archive_path)
            .finish()
    }
}

/// Copy instructions plus the per-file errors that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallResult {
    pub instructions: Vec<CopyInstruction>,
    pub failures: Vec<FileFailure>,
}

/// An archive installer registered with the host
#[async_trait]
pub trait ModInstaller: Send + Sync {
    fn id(&self) -> &'static str;

    /// Lower values are tried first
    fn priority(&self) -> u32;

    fn test(&self, files: &[String], game_id: &str) -> SupportResult;

    async fn install(&self, request: &InstallRequest) -> Result<InstallResult>;
}

pub(crate) fn ensure_game(game_id: &str) -> Result<()> {
    if game_id == GAME_ID {
        Ok(())
    } else {
        Err(InstallError::UnsupportedGame {
            game_id: game_id.to_string(),
        })
    }
}

pub(crate) fn any_file_named(files: &[String], name: &str) -> bool {
    files.iter().any(|file| {
        SegmentedPath::new(file)
            .file_name()
            .is_some_and(|file_name| file_name.eq_ignore_ascii_case(name))
    })
}

/// Stat every archive entry below `working_dir`.
///
/// A failing entry is reported to the host and skipped; the remaining
/// entries are still processed.
pub(crate) async fn stat_entries(
    host: &dyn InstallHost,
    request: &InstallRequest,
) -> (Vec<ArchiveEntry>, Vec<FileFailure>) {
    let mut entries = Vec::with_capacity(request.files.len());
    let mut failures = Vec::new();
    let total = request.files.len().max(1) as f64;

    for (done, file) in request.files.iter().enumerate() {
        match fs::metadata(request.working_dir.join(file)).await {
            Ok(metadata) => entries.push(ArchiveEntry {
                path: file.clone(),
                is_dir: metadata.is_dir(),
            }),
            Err(e) => {
                warn!("Failed to stat {}: {}", file, e);
                let failure = FileFailure::stat(file, &e);
                host.notify(Notification::file_error(&failure));
                failures.push(failure);
            }
        }
        request.report(InstallProgress::Progress {
            fraction: (done + 1) as f64 / total,
        });
    }

    (entries, failures)
}

/// Install flow shared by the layout-only installers
pub(crate) async fn install_layout(
    installer: &'static str,
    shape: ModShape,
    host: &dyn InstallHost,
    request: &InstallRequest,
) -> Result<InstallResult> {
    ensure_game(&request.game_id)?;
    request.report(InstallProgress::Started {
        installer,
        files: request.files.len(),
    });

    let (entries, failures) = stat_entries(host, request).await;
    let plan = plan(shape, &entries, &ArchiveFacts::default());
    debug!(
        "{}: {} instructions, {} files dropped",
        installer,
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
