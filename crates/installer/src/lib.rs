//! Schedule 1 mod installer
//!
//! This library routes the contents of mod archives for Schedule 1 into
//! the folder layout of the BepInEx or MelonLoader mod loaders, and can
//! fetch a missing loader from its GitHub release feed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use s1_installer::{InstallRequest, InstallerRegistry, UnattendedHost};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), s1_installer::InstallError> {
//! let registry = InstallerRegistry::schedule_one(Arc::new(UnattendedHost), None, None);
//!
//! let files = vec![
//!     "MyMod/plugins/MyMod.dll".to_string(),
//!     "MyMod/README.md".to_string(),
//! ];
//! let request = InstallRequest::new(files, "/path/to/staged/archive");
//!
//! if let Some(result) = registry.install(&request).await {
//!     for instruction in result?.instructions {
//!         println!("{} -> {}", instruction.source, instruction.destination);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Path classification**: anchor folders found at any depth, matched case-insensitively
//! - **Content sniffing**: patcher, plugin and mod roles inferred from assembly content
//! - **Package checks**: mixed-loader and multi-variant archives are detected before install
//! - **Loader bootstrap**: latest BepInEx or MelonLoader release fetched and handed to the host
//! - **Game discovery**: Steam library lookup and mod folder preparation

pub mod bootstrap;
pub mod ecosystem;
pub mod game;
pub mod install;

// Re-export commonly used types for convenience
pub use bootstrap::{BootstrapConfig, BootstrapError, LoaderBootstrap, LoaderBootstrapper, ModPipeline};
pub use ecosystem::Ecosystem;
pub use game::{GAME_ID, GameDefinition, GameError, SCHEDULE_ONE, SteamLocator};
pub use install::{
    ArchiveEntry, Choice, CopyInstruction, InstallError, InstallHost, InstallRequest,
    InstallResult, InstallerRegistry, ModInstaller, Notification, Prompt, UnattendedHost,
};
