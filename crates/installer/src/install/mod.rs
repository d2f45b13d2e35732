//! Archive installation
//!
//! Routes the files of a staged mod archive into the BepInEx or MelonLoader
//! layout of the game. The pure parts (classification, resolution, policy)
//! never touch the filesystem or the host; the installers drive them and
//! talk to the host through [`host::InstallHost`].

pub mod classifier;
pub mod error;
pub mod host;
pub mod installers;
pub mod paths;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod sniffer;

// Re-export commonly used types
pub use classifier::{Anchor, ClassifiedPath, classify};
pub use error::{CancelReason, FileFailure, InstallError};
pub use host::{Choice, InstallHost, Notification, Prompt, Severity, UnattendedHost};
pub use installers::{
    InstallProgress, InstallRequest, InstallResult, ModInstaller, ProgressCallback, SupportResult,
};
pub use paths::ArchiveEntry;
pub use policy::{ArchiveFacts, Decision};
pub use registry::InstallerRegistry;
pub use resolver::{CopyInstruction, ModShape, Resolution, VariantSet, resolve};
pub use sniffer::{ContentSniffer, MarkerSniffer, PluginRole, Sniff};
