//! Archive path handling
//!
//! Archive entries come from third-party archives and may use either `/` or
//! `\` as separator, with arbitrary casing. A [`SegmentedPath`] splits an
//! entry once, keeps the original casing for output and a lowercase copy
//! for anchor matching.

use serde::{Deserialize, Serialize};

/// BepInEx root folder, relative to the game directory
pub const BEPINEX_ROOT: &str = "bepinex";
/// BepInEx plugin folder
pub const BEPINEX_PLUGINS: &str = "bepinex/plugins";
/// BepInEx preloader patcher folder
pub const BEPINEX_PATCHERS: &str = "bepinex/patchers";
/// BepInEx configuration folder
pub const BEPINEX_CONFIG: &str = "bepinex/config";

/// MelonLoader root folder, relative to the game directory
pub const MELONLOADER_ROOT: &str = "MelonLoader";
/// MelonLoader mods folder
pub const MELONLOADER_MODS: &str = "mods";
/// MelonLoader plugins folder
pub const MELONLOADER_PLUGINS: &str = "plugins";
/// MelonLoader user data (configuration) folder
pub const MELONLOADER_CONFIG: &str = "userdata";

/// Scripts folder read by the ScheduleLua loader
pub const LUA_SCRIPTS: &str = "mods/schedulelua/scripts";

/// Extension of native loader plugins
pub const BINARY_PLUGIN_EXTENSION: &str = "dll";
/// Extension of Lua scripts
pub const LUA_EXTENSION: &str = "lua";
/// Extensions treated as documentation and never installed without an anchor
pub const DOCUMENTATION_EXTENSIONS: &[&str] = &["md"];

/// One entry of a staged archive extraction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Path relative to the extraction root
    pub path: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl ArchiveEntry {
    pub fn file<S: Into<String>>(path: S) -> Self {
        Self { path: path.into(), is_dir: false }
    }

    pub fn dir<S: Into<String>>(path: S) -> Self {
        Self { path: path.into(), is_dir: true }
    }
}

/// An archive-relative path split into segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedPath {
    original: String,
    segments: Vec<String>,
    lowered: Vec<String>,
}

impl SegmentedPath {
    pub fn new(path: &str) -> Self {
        let segments: Vec<String> = path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        let lowered = segments.iter().map(|s| s.to_lowercase()).collect();

        Self {
            original: path.to_string(),
            segments,
            lowered,
        }
    }

    /// The path exactly as supplied by the host
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Index of the first directory segment equal to `name` (lowercase).
    ///
    /// The final segment is the file itself and never counts as a directory.
    pub fn directory_position(&self, name: &str) -> Option<usize> {
        let dir_count = self.lowered.len().saturating_sub(1);
        self.lowered[..dir_count].iter().position(|s| s == name)
    }

    /// Last segment, with original casing
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Lowercase extension of the file name, without the dot.
    ///
    /// Dotfiles (`.gitignore`) and names ending in a dot have no extension.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name()?;
        let dot = name.rfind('.')?;
        if dot == 0 || dot + 1 == name.len() {
            return None;
        }
        Some(name[dot + 1..].to_lowercase())
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension().is_some_and(|e| e == ext)
    }

    /// Segments from `start` onward joined with `/`
    pub fn join_from(&self, start: usize) -> String {
        let start = start.min(self.segments.len());
        self.segments[start..].join("/")
    }

    /// Segments before `end` joined with `/`
    pub fn join_before(&self, end: usize) -> String {
        let end = end.min(self.segments.len());
        self.segments[..end].join("/")
    }
}

/// Join a destination base folder with a relative remainder
pub fn join_destination(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{rest}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_both_separators() {
        let path = SegmentedPath::new("Mod\\BepInEx/plugins\\Foo.dll");
        assert_eq!(path.segments(), ["Mod", "BepInEx", "plugins", "Foo.dll"]);
        assert_eq!(path.original(), "Mod\\BepInEx/plugins\\Foo.dll");
    }

    #[test]
    fn ignores_empty_segments() {
        let path = SegmentedPath::new("/mods//foo.lua");
        assert_eq!(path.segments(), ["mods", "foo.lua"]);
    }

    #[test]
    fn directory_position_is_case_insensitive_and_skips_file_name() {
        let path = SegmentedPath::new("A/PLUGINS/config");
        assert_eq!(path.directory_position("plugins"), Some(1));
        assert_eq!(path.directory_position("config"), None);
    }

    #[test]
    fn directory_position_returns_first_occurrence() {
        let path = SegmentedPath::new("plugins/x/plugins/y.dll");
        assert_eq!(path.directory_position("plugins"), Some(0));
    }

    #[test]
    fn extension_rules() {
        assert_eq!(SegmentedPath::new("a/Foo.DLL").extension().as_deref(), Some("dll"));
        assert_eq!(SegmentedPath::new("a/LICENSE").extension(), None);
        assert_eq!(SegmentedPath::new("a/.gitignore").extension(), None);
        assert_eq!(SegmentedPath::new("a/odd.").extension(), None);
        assert_eq!(SegmentedPath::new("a/b.tar.gz").extension().as_deref(), Some("gz"));
    }

    #[test]
    fn join_helpers_clamp() {
        let path = SegmentedPath::new("a/b/c");
        assert_eq!(path.join_from(1), "b/c");
        assert_eq!(path.join_from(9), "");
        assert_eq!(path.join_before(2), "a/b");
        assert_eq!(path.join_before(0), "");
    }

    #[test]
    fn join_destination_handles_empty_parts() {
        assert_eq!(join_destination("bepinex/plugins", "a.dll"), "bepinex/plugins/a.dll");
        assert_eq!(join_destination("", "a.dll"), "a.dll");
        assert_eq!(join_destination("mods", ""), "mods");
    }
}
