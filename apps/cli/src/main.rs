//! s1-mods - Schedule 1 mod installer CLI

mod console;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use s1_installer::bootstrap::ReleaseClient;
use s1_installer::{
    BootstrapConfig, Ecosystem, InstallRequest, InstallerRegistry, SCHEDULE_ONE, SteamLocator,
};
use tracing::{Level, info};
use walkdir::WalkDir;

use crate::console::ConsoleHost;

#[derive(Parser)]
#[command(name = "s1-mods")]
#[command(author, version, about = "Schedule 1 mod installer")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the game installation path
    FindGame,
    /// Create the loader folders in the game directory
    Prepare {
        /// Game directory (discovered when omitted)
        #[arg(long)]
        game_path: Option<PathBuf>,
    },
    /// Print the copy instructions for an extracted mod archive
    Plan {
        /// Directory the archive was extracted to
        staging_dir: PathBuf,
        /// Game directory used to check for installed loaders
        #[arg(long)]
        game_path: Option<PathBuf>,
        /// Never prompt; every question takes its default answer
        #[arg(long)]
        unattended: bool,
    },
    /// Download the latest release of a mod loader
    FetchLoader {
        /// bepinex or melonloader
        loader: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Ignore error if .env not present

    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::FindGame => {
            let path = find_game().await?;
            println!("{}", path.display());
        }
        Commands::Prepare { game_path } => {
            let game_path = match game_path {
                Some(path) => path,
                None => find_game().await?,
            };
            SCHEDULE_ONE
                .prepare_for_modding(&game_path)
                .await
                .context("Failed to prepare for modding")?;
            info!("Prepared {}", game_path.display());
        }
        Commands::Plan {
            staging_dir,
            game_path,
            unattended,
        } => plan(&staging_dir, game_path, unattended).await?,
        Commands::FetchLoader { loader, out } => {
            let Some(ecosystem) = Ecosystem::from_name(&loader) else {
                bail!("Unknown loader '{}', expected bepinex or melonloader", loader);
            };
            let client = ReleaseClient::new(BootstrapConfig::default())?;
            let downloaded = client
                .fetch_loader(ecosystem, &out)
                .await
                .with_context(|| format!("Failed to fetch {ecosystem}"))?;
            println!("{} {} -> {}", ecosystem, downloaded.version, downloaded.path.display());
        }
    }

    Ok(())
}

async fn find_game() -> Result<PathBuf> {
    let path = SCHEDULE_ONE
        .find_installation(&SteamLocator::discover())
        .await?;
    Ok(path)
}

/// Archive-relative entries of an extraction, `/` separated, root excluded
fn list_entries(staging_dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(staging_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(staging_dir)?;
        let segments: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(segments.join("/"));
    }
    Ok(files)
}

async fn plan(staging_dir: &Path, game_path: Option<PathBuf>, unattended: bool) -> Result<()> {
    let files = list_entries(staging_dir)
        .with_context(|| format!("Failed to list {}", staging_dir.display()))?;
    let game_path = match game_path {
        Some(path) => Some(path),
        None => find_game().await.ok(),
    };

    let registry = InstallerRegistry::schedule_one(Arc::new(ConsoleHost), None, game_path);
    let request = InstallRequest::new(files, staging_dir).with_unattended(unattended);

    let Some(installer) = registry.find_installer(&request.files, &request.game_id) else {
        bail!("No installer supports {}", staging_dir.display());
    };
    info!("Using installer {}", installer.id());

    match installer.install(&request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) if e.is_user_cancellation() => {
            info!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
