//! Content sniffing for native plugin files
//!
//! Archive authors rarely ship the folder that tells a BepInEx patcher from
//! a plugin, or a MelonLoader mod from a plugin. The assemblies themselves
//! reference the loader's types though, so the loader and role are inferred
//! from marker strings in the file content.

use std::path::Path;

use futures::stream::{self, StreamExt};
use tokio::fs;
use tracing::debug;

use crate::ecosystem::Ecosystem;
use crate::install::error::FileFailure;
use crate::install::paths::{
    SegmentedPath, BEPINEX_PATCHERS, BEPINEX_PLUGINS, BINARY_PLUGIN_EXTENSION, MELONLOADER_MODS,
    MELONLOADER_PLUGINS,
};
use crate::install::policy::ArchiveFacts;

/// Role of a native plugin inside its loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginRole {
    /// BepInEx preloader patcher
    Patcher,
    /// BepInEx plugin (derives from `BaseUnityPlugin`)
    Plugin,
    /// MelonLoader mod
    Mod,
    /// MelonLoader plugin
    MelonPlugin,
}

impl PluginRole {
    pub fn ecosystem(self) -> Ecosystem {
        match self {
            PluginRole::Patcher | PluginRole::Plugin => Ecosystem::BepInEx,
            PluginRole::Mod | PluginRole::MelonPlugin => Ecosystem::MelonLoader,
        }
    }

    /// Default install folder for files of this role
    pub fn install_dir(self) -> &'static str {
        match self {
            PluginRole::Patcher => BEPINEX_PATCHERS,
            PluginRole::Plugin => BEPINEX_PLUGINS,
            PluginRole::Mod => MELONLOADER_MODS,
            PluginRole::MelonPlugin => MELONLOADER_PLUGINS,
        }
    }
}

/// What a sniffer learned from one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniff {
    pub ecosystem: Ecosystem,
    pub role: PluginRole,
}

impl Sniff {
    pub fn new(role: PluginRole) -> Self {
        Self {
            ecosystem: role.ecosystem(),
            role,
        }
    }
}

/// Infers loader facts from file content
pub trait ContentSniffer: Send + Sync {
    /// Whether the file at `path` should be read at all
    fn applies_to(&self, path: &SegmentedPath) -> bool {
        path.has_extension(BINARY_PLUGIN_EXTENSION)
    }

    /// Inspect file content; `None` when no loader marker is present
    fn sniff(&self, content: &[u8]) -> Option<Sniff>;
}

/// Substring based sniffer
///
/// A file mentioning `BepInEx` is a BepInEx patcher unless it also mentions
/// `BaseUnityPlugin`. Otherwise a file mentioning `MelonLoader` is a
/// MelonLoader mod unless it also mentions `MelonPlugin`.
#[derive(Debug, Clone)]
pub struct MarkerSniffer {
    pub bepinex_marker: Vec<u8>,
    pub bepinex_plugin_marker: Vec<u8>,
    pub melonloader_marker: Vec<u8>,
    pub melonloader_plugin_marker: Vec<u8>,
}

impl Default for MarkerSniffer {
    fn default() -> Self {
        Self {
            bepinex_marker: b"BepInEx".to_vec(),
            bepinex_plugin_marker: b"BaseUnityPlugin".to_vec(),
            melonloader_marker: b"MelonLoader".to_vec(),
            melonloader_plugin_marker: b"MelonPlugin".to_vec(),
        }
    }
}

impl ContentSniffer for MarkerSniffer {
    fn sniff(&self, content: &[u8]) -> Option<Sniff> {
        if contains(content, &self.bepinex_marker) {
            let role = if contains(content, &self.bepinex_plugin_marker) {
                PluginRole::Plugin
            } else {
                PluginRole::Patcher
            };
            return Some(Sniff::new(role));
        }

        if contains(content, &self.melonloader_marker) {
            let role = if contains(content, &self.melonloader_plugin_marker) {
                PluginRole::MelonPlugin
            } else {
                PluginRole::Mod
            };
            return Some(Sniff::new(role));
        }

        None
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

/// Outcome of the sniffing pre-pass over a whole archive
#[derive(Debug, Default)]
pub struct SniffReport {
    pub facts: ArchiveFacts,
    pub failures: Vec<FileFailure>,
}

/// Files read at the same time while sniffing an archive
pub const MAX_CONCURRENT_READS: usize = 8;

/// Read and sniff every candidate file of a staged archive.
///
/// At most [`MAX_CONCURRENT_READS`] files are read at once. Results are
/// folded into one [`ArchiveFacts`] after all reads finished, so no state is
/// shared between the reads. Failures are sorted by path.
pub async fn sniff_archive(
    sniffer: &dyn ContentSniffer,
    working_dir: &Path,
    files: &[String],
) -> SniffReport {
    let reads: Vec<_> = files
        .iter()
        .filter(|file| sniffer.applies_to(&SegmentedPath::new(file)))
        .map(|file| async move {
            let result = fs::read(working_dir.join(file)).await;
            (file, result)
        })
        .collect();
    let results: Vec<_> = stream::iter(reads)
        .buffer_unordered(MAX_CONCURRENT_READS)
        .collect()
        .await;

    let mut report = SniffReport::default();
    for (file, result) in results {
        match result {
            Ok(content) => {
                if let Some(sniff) = sniffer.sniff(&content) {
                    debug!("Sniffed {} as {:?} {:?}", file, sniff.ecosystem, sniff.role);
                    report.facts.record(file, sniff);
                }
            }
            Err(e) => report.failures.push(FileFailure::read(file, &e)),
        }
    }
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff(content: &[u8]) -> Option<Sniff> {
        MarkerSniffer::default().sniff(content)
    }

    #[test]
    fn bepinex_without_base_class_is_patcher() {
        let result = sniff(b"\0\0BepInEx.Preloader\0Patch\0").unwrap();
        assert_eq!(result.ecosystem, Ecosystem::BepInEx);
        assert_eq!(result.role, PluginRole::Patcher);
    }

    #[test]
    fn bepinex_with_base_class_is_plugin() {
        let result = sniff(b"BepInEx\0BaseUnityPlugin\0").unwrap();
        assert_eq!(result.role, PluginRole::Plugin);
    }

    #[test]
    fn melonloader_roles() {
        assert_eq!(
            sniff(b"MelonLoader\0MelonMod").unwrap().role,
            PluginRole::Mod
        );
        assert_eq!(
            sniff(b"MelonLoader\0MelonPlugin").unwrap().role,
            PluginRole::MelonPlugin
        );
    }

    #[test]
    fn bepinex_marker_wins_within_one_file() {
        let result = sniff(b"MelonLoader BepInEx").unwrap();
        assert_eq!(result.ecosystem, Ecosystem::BepInEx);
    }

    #[test]
    fn no_marker() {
        assert_eq!(sniff(b"MZ\x90\0plain assembly"), None);
        assert_eq!(sniff(b""), None);
    }

    #[test]
    fn markers_are_case_sensitive() {
        assert_eq!(sniff(b"bepinex melonloader"), None);
    }

    #[test]
    fn only_dll_files_apply() {
        let sniffer = MarkerSniffer::default();
        assert!(sniffer.applies_to(&SegmentedPath::new("a/Foo.DLL")));
        assert!(!sniffer.applies_to(&SegmentedPath::new("a/Foo.lua")));
        assert!(!sniffer.applies_to(&SegmentedPath::new("a/dll")));
    }

    #[tokio::test]
    async fn sniff_archive_collects_facts_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Mod")).unwrap();
        std::fs::write(dir.path().join("Mod/Patch.dll"), b"BepInEx").unwrap();
        std::fs::write(dir.path().join("Mod/readme.txt"), b"MelonLoader").unwrap();

        let files = vec![
            "Mod/Patch.dll".to_string(),
            "Mod/readme.txt".to_string(),
            "Mod/Missing.dll".to_string(),
        ];
        let report = sniff_archive(&MarkerSniffer::default(), dir.path(), &files).await;

        assert!(report.facts.has(Ecosystem::BepInEx));
        assert!(!report.facts.has(Ecosystem::MelonLoader));
        assert_eq!(
            report.facts.role_for("Mod/Patch.dll"),
            Some(PluginRole::Patcher)
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "Mod/Missing.dll");
    }

    #[tokio::test]
    async fn sniff_archive_handles_more_files_than_read_slots() {
        let dir = tempfile::tempdir().unwrap();
        let count = MAX_CONCURRENT_READS * 3;
        let mut files = Vec::new();
        for i in 0..count {
            let file = format!("Mod/Plugin{i}.dll");
            std::fs::create_dir_all(dir.path().join("Mod")).unwrap();
            std::fs::write(dir.path().join(&file), b"BepInEx BaseUnityPlugin").unwrap();
            files.push(file);
        }
        files.push("Mod/GoneB.dll".to_string());
        files.push("Mod/GoneA.dll".to_string());

        let report = sniff_archive(&MarkerSniffer::default(), dir.path(), &files).await;

        for file in &files[..count] {
            assert_eq!(report.facts.role_for(file), Some(PluginRole::Plugin));
        }
        let failed: Vec<_> = report.failures.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(failed, ["Mod/GoneA.dll", "Mod/GoneB.dll"]);
    }
}
