//! Path classification
//!
//! Finds the anchor folder (a directory name with a fixed meaning for one of
//! the loaders) inside an archive path. Anchors are checked in the order the
//! caller passes them; for each anchor the first matching directory segment
//! wins. A path containing several anchor names therefore resolves to the
//! anchor listed first, not to the leftmost segment.

use crate::ecosystem::Ecosystem;
use crate::install::paths::SegmentedPath;
use serde::Serialize;

/// A directory name with a fixed meaning for one loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// `BepInEx/`: the author mirrors the game layout
    BepInExRoot,
    /// `plugins/`
    Plugins,
    /// `patchers/`
    Patchers,
    /// `config/`
    Config,
    /// `MelonLoader/`: the author mirrors the game layout
    MelonLoaderRoot,
    /// `UserLibs/`
    UserLibs,
    /// `UserData/`
    UserData,
    /// `Mods/`
    Mods,
}

impl Anchor {
    /// Lowercase directory name matched by this anchor
    pub fn segment(self) -> &'static str {
        match self {
            Anchor::BepInExRoot => "bepinex",
            Anchor::Plugins => "plugins",
            Anchor::Patchers => "patchers",
            Anchor::Config => "config",
            Anchor::MelonLoaderRoot => "melonloader",
            Anchor::UserLibs => "userlibs",
            Anchor::UserData => "userdata",
            Anchor::Mods => "mods",
        }
    }

    /// Loader the anchor belongs to
    pub fn ecosystem(self) -> Ecosystem {
        match self {
            Anchor::BepInExRoot | Anchor::Plugins | Anchor::Patchers | Anchor::Config => {
                Ecosystem::BepInEx
            }
            Anchor::MelonLoaderRoot | Anchor::UserLibs | Anchor::UserData | Anchor::Mods => {
                Ecosystem::MelonLoader
            }
        }
    }

    /// Whether the anchor is a loader's root folder
    pub fn is_ecosystem_root(self) -> bool {
        matches!(self, Anchor::BepInExRoot | Anchor::MelonLoaderRoot)
    }
}

/// Anchor precedence for native plugin archives; loader roots come first
pub const PLUGIN_ANCHORS: &[Anchor] = &[
    Anchor::BepInExRoot,
    Anchor::MelonLoaderRoot,
    Anchor::Plugins,
    Anchor::Patchers,
    Anchor::Config,
    Anchor::UserLibs,
    Anchor::UserData,
];

/// Anchors understood by the S1API loader installer
pub const API_LOADER_ANCHORS: &[Anchor] = &[Anchor::Plugins];

/// Anchors understood by the ScheduleLua loader installer
pub const SCRIPT_LOADER_ANCHORS: &[Anchor] = &[Anchor::Mods, Anchor::UserLibs];

/// The anchor found in a path and its segment index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedAnchor {
    pub anchor: Anchor,
    pub index: usize,
}

/// Result of classifying one archive path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPath {
    pub path: SegmentedPath,
    pub matched: Option<MatchedAnchor>,
}

impl ClassifiedPath {
    pub fn original(&self) -> &str {
        self.path.original()
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.matched.map(|m| m.anchor)
    }

    pub fn anchor_index(&self) -> Option<usize> {
        self.matched.map(|m| m.index)
    }

    /// Loader implied by the anchor, if any
    pub fn ecosystem(&self) -> Option<Ecosystem> {
        self.anchor().map(Anchor::ecosystem)
    }
}

/// Classify `path` against `known_anchors`, checked in order
pub fn classify(path: &str, known_anchors: &[Anchor]) -> ClassifiedPath {
    let path = SegmentedPath::new(path);
    let matched = known_anchors.iter().find_map(|&anchor| {
        path.directory_position(anchor.segment())
            .map(|index| MatchedAnchor { anchor, index })
    });

    ClassifiedPath { path, matched }
}
