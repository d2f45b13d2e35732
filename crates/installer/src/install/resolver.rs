//! Destination resolution
//!
//! Turns a classified archive path into the path it must be copied to,
//! relative to the game's mod staging root. Which rules apply depends on the
//! shape of mod being installed; see [`ModShape`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ecosystem::Ecosystem;
use crate::install::classifier::{
    API_LOADER_ANCHORS, Anchor, ClassifiedPath, MatchedAnchor, PLUGIN_ANCHORS,
    SCRIPT_LOADER_ANCHORS, classify,
};
use crate::install::paths::{
    ArchiveEntry, BEPINEX_CONFIG, BEPINEX_PATCHERS, BEPINEX_PLUGINS, BINARY_PLUGIN_EXTENSION,
    DOCUMENTATION_EXTENSIONS, LUA_EXTENSION, LUA_SCRIPTS, MELONLOADER_CONFIG, MELONLOADER_MODS,
    join_destination,
};
use crate::install::policy::ArchiveFacts;

/// The kind of mod an installer handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModShape {
    /// Loose Lua scripts for ScheduleLua
    LuaScript,
    /// S1API loader packages (`plugins/` trees)
    ApiLoader,
    /// ScheduleLua loader packages (`mods/` and `userlibs/` trees)
    ScriptLoader,
    /// BepInEx or MelonLoader native plugins
    NativePlugin,
}

impl ModShape {
    /// Anchors checked for this shape, in precedence order
    pub fn anchors(self) -> &'static [Anchor] {
        match self {
            ModShape::LuaScript => &[],
            ModShape::ApiLoader => API_LOADER_ANCHORS,
            ModShape::ScriptLoader => SCRIPT_LOADER_ANCHORS,
            ModShape::NativePlugin => PLUGIN_ANCHORS,
        }
    }
}

/// One file copy emitted by an installer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename = "copy")]
pub struct CopyInstruction {
    /// Path inside the archive, as supplied by the host
    pub source: String,
    /// Path relative to the mod staging root
    pub destination: String,
}

impl CopyInstruction {
    pub fn new<S: Into<String>, D: Into<String>>(source: S, destination: D) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Why a file produced no instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// None of the shape's anchors is present
    NoAnchor,
    /// Documentation outside any anchor
    Documentation,
    /// No anchor and the archive's loader is unknown
    UnknownEcosystem,
    /// Not a Lua script
    NotLuaScript,
}

/// Outcome of resolving one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Copy {
        destination: String,
        /// Folder prefix in front of a layout-mirroring anchor
        variant: Option<String>,
    },
    Drop(DropReason),
}

impl Resolution {
    fn copy(destination: String) -> Self {
        Resolution::Copy {
            destination,
            variant: None,
        }
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Resolution::Copy { destination, .. } => Some(destination),
            Resolution::Drop(_) => None,
        }
    }
}

/// Distinct folder prefixes found in front of layout-mirroring anchors.
///
/// Prefixes are compared case-insensitively. More than one prefix means the
/// archive ships alternative copies of the mod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet(BTreeSet<String>);

impl VariantSet {
    pub fn record(&mut self, prefix: &str) {
        self.0.insert(prefix.to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_conflicting(&self) -> bool {
        self.0.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Resolve a classified path for the given mod shape
pub fn resolve(shape: ModShape, classified: &ClassifiedPath, facts: &ArchiveFacts) -> Resolution {
    match shape {
        ModShape::LuaScript => resolve_lua_script(classified),
        ModShape::ApiLoader | ModShape::ScriptLoader => resolve_anchored_tree(classified),
        ModShape::NativePlugin => resolve_native_plugin(classified, facts),
    }
}

fn resolve_lua_script(classified: &ClassifiedPath) -> Resolution {
    let path = &classified.path;
    match path.file_name() {
        Some(name) if path.has_extension(LUA_EXTENSION) => {
            Resolution::copy(join_destination(LUA_SCRIPTS, name))
        }
        _ => Resolution::Drop(DropReason::NotLuaScript),
    }
}

fn resolve_anchored_tree(classified: &ClassifiedPath) -> Resolution {
    match classified.matched {
        Some(MatchedAnchor { index, .. }) => Resolution::copy(classified.path.join_from(index)),
        None => Resolution::Drop(DropReason::NoAnchor),
    }
}

fn resolve_native_plugin(classified: &ClassifiedPath, facts: &ArchiveFacts) -> Resolution {
    let path = &classified.path;
    let Some(MatchedAnchor { anchor, index }) = classified.matched else {
        return resolve_unanchored(classified, facts);
    };

    match anchor {
        Anchor::BepInExRoot | Anchor::MelonLoaderRoot | Anchor::UserLibs => Resolution::Copy {
            destination: path.join_from(index),
            variant: Some(path.join_before(index)),
        },
        Anchor::Plugins => Resolution::copy(join_destination(BEPINEX_PLUGINS, &path.join_from(index + 1))),
        Anchor::Patchers => {
            Resolution::copy(join_destination(BEPINEX_PATCHERS, &path.join_from(index + 1)))
        }
        Anchor::Config => Resolution::copy(join_destination(BEPINEX_CONFIG, &path.join_from(index + 1))),
        Anchor::UserData => {
            Resolution::copy(join_destination(MELONLOADER_CONFIG, &path.join_from(index + 1)))
        }
        Anchor::Mods => Resolution::copy(path.join_from(index)),
    }
}

fn resolve_unanchored(classified: &ClassifiedPath, facts: &ArchiveFacts) -> Resolution {
    let path = &classified.path;
    let extension = path.extension();

    if extension
        .as_deref()
        .is_some_and(|ext| DOCUMENTATION_EXTENSIONS.contains(&ext))
    {
        return Resolution::Drop(DropReason::Documentation);
    }

    let Some(ecosystem) = facts.ecosystem() else {
        return Resolution::Drop(DropReason::UnknownEcosystem);
    };
    let Some(file_name) = path.file_name() else {
        return Resolution::Drop(DropReason::NoAnchor);
    };

    if extension.as_deref() == Some(BINARY_PLUGIN_EXTENSION) {
        let role = facts
            .role_for(classified.original())
            .filter(|role| role.ecosystem() == ecosystem)
            .unwrap_or_else(|| facts.default_role(ecosystem));
        return Resolution::copy(join_destination(role.install_dir(), file_name));
    }

    // Companion files keep their layout below the archive's top folder
    let base = match ecosystem {
        Ecosystem::BepInEx => BEPINEX_PLUGINS,
        Ecosystem::MelonLoader => MELONLOADER_MODS,
    };
    let rest = if path.len() > 1 {
        path.join_from(1)
    } else {
        file_name.to_string()
    };
    Resolution::copy(join_destination(base, &rest))
}

/// Instructions and package facts for a list of archive entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub instructions: Vec<CopyInstruction>,
    pub variants: VariantSet,
    pub dropped: Vec<(String, DropReason)>,
}

/// Resolve every file entry of an archive, in input order
pub fn plan(shape: ModShape, entries: &[ArchiveEntry], facts: &ArchiveFacts) -> Plan {
    let mut plan = Plan::default();

    for entry in entries.iter().filter(|e| !e.is_dir) {
        let classified = classify(&entry.path, shape.anchors());
        match resolve(shape, &classified, facts) {
            Resolution::Copy { destination, variant } => {
                if let Some(prefix) = variant {
                    plan.variants.record(&prefix);
                }
                plan.instructions
                    .push(CopyInstruction::new(entry.path.clone(), destination));
            }
            Resolution::Drop(reason) => plan.dropped.push((entry.path.clone(), reason)),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::sniffer::{PluginRole, Sniff};

    fn native(path: &str, facts: &ArchiveFacts) -> Resolution {
        resolve(ModShape::NativePlugin, &classify(path, PLUGIN_ANCHORS), facts)
    }

    fn dest(resolution: &Resolution) -> &str {
        resolution.destination().expect("expected a copy")
    }

    fn facts(entries: &[(&str, PluginRole)]) -> ArchiveFacts {
        let mut facts = ArchiveFacts::default();
        for (path, role) in entries {
            facts.record(path, Sniff::new(*role));
        }
        facts
    }

    #[test]
    fn ecosystem_root_is_preserved_verbatim_at_any_depth() {
        let none = ArchiveFacts::default();
        for (source, expected) in [
            ("BepInEx/plugins/A.dll", "BepInEx/plugins/A.dll"),
            ("Pack/BepInEx/config/a.cfg", "BepInEx/config/a.cfg"),
            ("x/y/z/bepinex/Weird/Deep/File.bin", "bepinex/Weird/Deep/File.bin"),
            ("Pack/MelonLoader/net6/Extra.dll", "MelonLoader/net6/Extra.dll"),
        ] {
            assert_eq!(dest(&native(source, &none)), expected);
        }
    }

    #[test]
    fn ecosystem_root_records_variant_prefix() {
        let resolution = native("VariantA/Sub/BepInEx/x.dll", &ArchiveFacts::default());
        assert_eq!(
            resolution,
            Resolution::Copy {
                destination: "BepInEx/x.dll".to_string(),
                variant: Some("VariantA/Sub".to_string()),
            }
        );
    }

    #[test]
    fn melonloader_root_keeps_inner_bepinex_names() {
        let none = ArchiveFacts::default();
        for (source, expected) in [
            ("Pack/MelonLoader/config/x.json", "MelonLoader/config/x.json"),
            ("Pack/MelonLoader/Plugins/x.dll", "MelonLoader/Plugins/x.dll"),
            ("Pack/MelonLoader/patchers/x.dll", "MelonLoader/patchers/x.dll"),
        ] {
            assert_eq!(
                native(source, &none),
                Resolution::Copy {
                    destination: expected.to_string(),
                    variant: Some("Pack".to_string()),
                }
            );
        }
    }

    #[test]
    fn bepinex_subfolders_are_rebased() {
        let none = ArchiveFacts::default();
        assert_eq!(dest(&native("Mod/plugins/Mod/Mod.dll", &none)), "bepinex/plugins/Mod/Mod.dll");
        assert_eq!(dest(&native("Mod/patchers/P.dll", &none)), "bepinex/patchers/P.dll");
        assert_eq!(dest(&native("Mod/config/mod.cfg", &none)), "bepinex/config/mod.cfg");
    }

    #[test]
    fn melonloader_folders() {
        let none = ArchiveFacts::default();
        assert_eq!(
            native("Mod/UserLibs/Lib.dll", &none),
            Resolution::Copy {
                destination: "UserLibs/Lib.dll".to_string(),
                variant: Some("Mod".to_string()),
            }
        );
        assert_eq!(dest(&native("Mod/UserData/Mod/a.json", &none)), "userdata/Mod/a.json");
    }

    #[test]
    fn unanchored_dll_uses_its_own_role_and_basename() {
        let facts = facts(&[
            ("Pack/Sub/Patch.dll", PluginRole::Patcher),
            ("Pack/Plugin.dll", PluginRole::Plugin),
        ]);
        assert_eq!(dest(&native("Pack/Sub/Patch.dll", &facts)), "bepinex/patchers/Patch.dll");
        assert_eq!(dest(&native("Pack/Plugin.dll", &facts)), "bepinex/plugins/Plugin.dll");
        // no marker of its own: archive default
        assert_eq!(dest(&native("Pack/Deep/Lib.dll", &facts)), "bepinex/plugins/Lib.dll");
    }

    #[test]
    fn unanchored_melonloader_dlls() {
        let mods = facts(&[("A/Mod.dll", PluginRole::Mod)]);
        assert_eq!(dest(&native("A/Mod.dll", &mods)), "mods/Mod.dll");

        let plugins = facts(&[("A/Plug.dll", PluginRole::MelonPlugin)]);
        assert_eq!(dest(&native("A/Deep/Plug.dll", &plugins)), "plugins/Plug.dll");
    }

    #[test]
    fn companion_files_drop_the_top_folder() {
        let bepinex = facts(&[("Mod/Mod.dll", PluginRole::Plugin)]);
        assert_eq!(dest(&native("Mod/assets/data.bin", &bepinex)), "bepinex/plugins/assets/data.bin");
        assert_eq!(dest(&native("Mod/LICENSE", &bepinex)), "bepinex/plugins/LICENSE");

        let melon = facts(&[("Mod/Mod.dll", PluginRole::Mod)]);
        assert_eq!(dest(&native("Mod/assets/data.bin", &melon)), "mods/assets/data.bin");
        assert_eq!(dest(&native("top.json", &melon)), "mods/top.json");
    }

    #[test]
    fn documentation_and_unknown_loader_are_dropped() {
        let bepinex = facts(&[("Mod/Mod.dll", PluginRole::Plugin)]);
        assert_eq!(native("Mod/README.md", &bepinex), Resolution::Drop(DropReason::Documentation));
        assert_eq!(
            native("Mod/README.md", &ArchiveFacts::default()),
            Resolution::Drop(DropReason::Documentation)
        );
        assert_eq!(
            native("Mod/Mod.dll", &ArchiveFacts::default()),
            Resolution::Drop(DropReason::UnknownEcosystem)
        );
    }

    #[test]
    fn anchored_documentation_is_kept() {
        let resolution = native("Mod/plugins/README.md", &ArchiveFacts::default());
        assert_eq!(dest(&resolution), "bepinex/plugins/README.md");
    }

    #[test]
    fn mixed_anchor_paths_follow_precedence() {
        let none = ArchiveFacts::default();
        assert_eq!(dest(&native("config/plugins/a.cfg", &none)), "bepinex/plugins/a.cfg");
        assert_eq!(dest(&native("plugins/config/a.cfg", &none)), "bepinex/plugins/config/a.cfg");
        assert_eq!(dest(&native("patchers/config/a.cfg", &none)), "bepinex/patchers/config/a.cfg");
        assert_eq!(dest(&native("UserData/BepInEx/a.cfg", &none)), "BepInEx/a.cfg");
    }

    #[test]
    fn resolving_twice_is_identical() {
        let facts = facts(&[("Mod/Mod.dll", PluginRole::Plugin)]);
        let classified = classify("Mod/Sub/thing.dat", PLUGIN_ANCHORS);
        let first = resolve(ModShape::NativePlugin, &classified, &facts);
        let second = resolve(ModShape::NativePlugin, &classified, &facts);
        assert_eq!(first, second);
    }

    #[test]
    fn lua_scripts_are_flattened() {
        let none = ArchiveFacts::default();
        let resolve_lua = |p: &str| resolve(ModShape::LuaScript, &classify(p, &[]), &none);

        assert_eq!(dest(&resolve_lua("mods/schedulelua/scripts/foo.lua")), "mods/schedulelua/scripts/foo.lua");
        assert_eq!(dest(&resolve_lua("A/B/C/D/bar.LUA")), "mods/schedulelua/scripts/bar.LUA");
        assert_eq!(resolve_lua("A/readme.txt"), Resolution::Drop(DropReason::NotLuaScript));
    }

    #[test]
    fn api_loader_keeps_plugins_tree() {
        let none = ArchiveFacts::default();
        let classified = classify("SomePlugin/plugins/SomePlugin.dll", API_LOADER_ANCHORS);
        assert_eq!(dest(&resolve(ModShape::ApiLoader, &classified, &none)), "plugins/SomePlugin.dll");

        let classified = classify("SomePlugin/SomePlugin.dll", API_LOADER_ANCHORS);
        assert_eq!(
            resolve(ModShape::ApiLoader, &classified, &none),
            Resolution::Drop(DropReason::NoAnchor)
        );
    }

    #[test]
    fn script_loader_keeps_mods_or_userlibs_tree() {
        let none = ArchiveFacts::default();
        let run = |p: &str| resolve(ModShape::ScriptLoader, &classify(p, SCRIPT_LOADER_ANCHORS), &none);

        assert_eq!(dest(&run("ScheduleLua/Mods/ScheduleLua.dll")), "Mods/ScheduleLua.dll");
        assert_eq!(dest(&run("ScheduleLua/UserLibs/MoonSharp.dll")), "UserLibs/MoonSharp.dll");
        // `mods` is checked before `userlibs`
        assert_eq!(dest(&run("UserLibs/Mods/x.dll")), "Mods/x.dll");
        assert_eq!(run("ScheduleLua/readme.txt"), Resolution::Drop(DropReason::NoAnchor));
    }

    #[test]
    fn plan_skips_directories_and_detects_variants() {
        let entries = vec![
            ArchiveEntry::dir("VariantA"),
            ArchiveEntry::dir("VariantA/BepInEx"),
            ArchiveEntry::file("VariantA/BepInEx/x.dll"),
            ArchiveEntry::file("VariantB/BepInEx/y.dll"),
        ];
        let plan = plan(ModShape::NativePlugin, &entries, &ArchiveFacts::default());

        assert_eq!(
            plan.instructions,
            vec![
                CopyInstruction::new("VariantA/BepInEx/x.dll", "BepInEx/x.dll"),
                CopyInstruction::new("VariantB/BepInEx/y.dll", "BepInEx/y.dll"),
            ]
        );
        assert!(plan.variants.is_conflicting());
    }

    #[test]
    fn plan_with_nothing_recognisable_is_empty() {
        let entries = vec![
            ArchiveEntry::file("Mod/Mod.dll"),
            ArchiveEntry::file("Mod/notes.txt"),
        ];
        let plan = plan(ModShape::NativePlugin, &entries, &ArchiveFacts::default());
        assert!(plan.instructions.is_empty());
        assert_eq!(plan.dropped.len(), 2);
    }

    #[test]
    fn copy_instruction_serializes_with_type_tag() {
        let json = serde_json::to_value(CopyInstruction::new("a", "b")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "copy", "source": "a", "destination": "b"}));
    }
}
