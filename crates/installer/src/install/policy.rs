//! Package level policy
//!
//! Per-file decisions are aggregated into [`ArchiveFacts`] and checked for
//! package shapes the extension cannot install: archives mixing both
//! loaders and archives shipping several variants of the same mod. The
//! checks only return [`Decision`]s; rendering them as prompts is up to the
//! installer driving the host.

use std::collections::{BTreeMap, BTreeSet};

use crate::ecosystem::Ecosystem;
use crate::install::resolver::VariantSet;
use crate::install::sniffer::{PluginRole, Sniff};

/// Loader facts accumulated over a whole archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveFacts {
    files: BTreeMap<String, Sniff>,
}

impl ArchiveFacts {
    pub fn record(&mut self, path: &str, sniff: Sniff) {
        self.files.insert(path.to_string(), sniff);
    }

    pub fn merge(&mut self, other: ArchiveFacts) {
        self.files.extend(other.files);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether any file was sniffed as belonging to `ecosystem`
    pub fn has(&self, ecosystem: Ecosystem) -> bool {
        self.files.values().any(|s| s.ecosystem == ecosystem)
    }

    /// Every loader seen in the archive
    pub fn ecosystems(&self) -> BTreeSet<Ecosystem> {
        self.files.values().map(|s| s.ecosystem).collect()
    }

    pub fn is_mixed(&self) -> bool {
        self.has(Ecosystem::BepInEx) && self.has(Ecosystem::MelonLoader)
    }

    /// The archive's loader; BepInEx wins when both are present
    pub fn ecosystem(&self) -> Option<Ecosystem> {
        Ecosystem::ALL.into_iter().find(|&e| self.has(e))
    }

    /// Role sniffed for one specific file
    pub fn role_for(&self, path: &str) -> Option<PluginRole> {
        self.files.get(path).map(|s| s.role)
    }

    /// Role used for files of `ecosystem` that carry no marker themselves.
    ///
    /// Any BepInEx plugin in the archive makes plugins the default, otherwise
    /// everything is treated as a patcher. MelonLoader works the same way
    /// with plugins and mods.
    pub fn default_role(&self, ecosystem: Ecosystem) -> PluginRole {
        let seen = |role: PluginRole| self.files.values().any(|s| s.role == role);

        match ecosystem {
            Ecosystem::BepInEx if seen(PluginRole::Plugin) => PluginRole::Plugin,
            Ecosystem::BepInEx => PluginRole::Patcher,
            Ecosystem::MelonLoader if seen(PluginRole::MelonPlugin) => PluginRole::MelonPlugin,
            Ecosystem::MelonLoader => PluginRole::Mod,
        }
    }
}

/// A package level situation that needs the user's input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Both loaders are present; the package must be rejected
    MixedEcosystems,
    /// A loader is needed but not installed in the game
    MissingLoader(Ecosystem),
    /// Several alternative copies of the mod were found
    VariantConflict { variants: Vec<String> },
}

/// Checks run after sniffing, before any destination is resolved.
///
/// A mixed package is reported alone: there is no point offering to install
/// loaders for an archive that will be rejected anyway.
pub fn evaluate_sniffed(facts: &ArchiveFacts, installed: &BTreeSet<Ecosystem>) -> Vec<Decision> {
    if facts.is_mixed() {
        return vec![Decision::MixedEcosystems];
    }

    facts
        .ecosystems()
        .into_iter()
        .filter(|ecosystem| !installed.contains(ecosystem))
        .map(Decision::MissingLoader)
        .collect()
}

/// Checks run once every destination has been resolved
pub fn evaluate_resolved(variants: &VariantSet) -> Option<Decision> {
    variants.is_conflicting().then(|| Decision::VariantConflict {
        variants: variants.iter().map(str::to_string).collect(),
    })
}
