//! Preset store and interchange
//!
//! The store always holds at least one preset and at most one of them is
//! active. Presets travel between users as camelCase JSON (see
//! [`encode_preset`] / [`parse_preset`]).

use ffradar_types::{ActorFilter, ActorFilterPreset};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PresetError;

/// Name of the preset created when the store would otherwise be empty
pub const DEFAULT_PRESET_NAME: &str = "Default";

/// Upper bound for generated `Preset#N` / `name#N` suffixes
const MAX_NAME_SUFFIX: usize = 10_000;

/// How to handle an imported preset whose name is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportConflict {
    /// Append the imported filters to the existing preset
    Merge,
    /// Add the import under a fresh `name#N`
    KeepSeparate,
    /// Leave the store untouched
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Added(String),
    Merged(String),
    Renamed(String),
    Cancelled,
}

// ═══════════════════════════════════════════════════════════════════════════
// Interchange
// ═══════════════════════════════════════════════════════════════════════════

/// Parse an interchange payload.
///
/// Empty text, anything that isn't a JSON object, and presets without a name
/// are rejected.
pub fn parse_preset(text: &str) -> Result<ActorFilterPreset, PresetError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PresetError::ImportMalformed("empty payload".to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| PresetError::ImportMalformed(e.to_string()))?;
    if !value.is_object() {
        return Err(PresetError::ImportMalformed(
            "payload is not a JSON object".to_string(),
        ));
    }

    let mut preset: ActorFilterPreset = serde_json::from_value(value)
        .map_err(|e| PresetError::ImportMalformed(e.to_string()))?;
    preset.name = preset.name.trim().to_string();
    if preset.name.is_empty() {
        return Err(PresetError::ImportMalformed("preset has no name".to_string()));
    }

    Ok(preset)
}

/// Encode a preset as interchange JSON. Output is deterministic.
pub fn encode_preset(preset: &ActorFilterPreset) -> Result<String, PresetError> {
    Ok(serde_json::to_string(preset)?)
}

// ═══════════════════════════════════════════════════════════════════════════
// Filter list editing
// ═══════════════════════════════════════════════════════════════════════════

/// Index-checked edits of a preset's ordered filter list
pub trait FilterListExt {
    fn push_filter(&mut self, filter: ActorFilter);
    fn remove_filter(&mut self, index: usize) -> Result<ActorFilter, PresetError>;
    /// Move the filter at `from` so it ends up at index `to`
    fn move_filter(&mut self, from: usize, to: usize) -> Result<(), PresetError>;
    fn replace_filter(&mut self, index: usize, filter: ActorFilter) -> Result<(), PresetError>;
}

impl FilterListExt for ActorFilterPreset {
    fn push_filter(&mut self, filter: ActorFilter) {
        self.filters.push(filter);
    }

    fn remove_filter(&mut self, index: usize) -> Result<ActorFilter, PresetError> {
        check_index(self, index)?;
        Ok(self.filters.remove(index))
    }

    fn move_filter(&mut self, from: usize, to: usize) -> Result<(), PresetError> {
        check_index(self, from)?;
        check_index(self, to)?;
        let filter = self.filters.remove(from);
        self.filters.insert(to, filter);
        Ok(())
    }

    fn replace_filter(&mut self, index: usize, filter: ActorFilter) -> Result<(), PresetError> {
        check_index(self, index)?;
        self.filters[index] = filter;
        Ok(())
    }
}

fn check_index(preset: &ActorFilterPreset, index: usize) -> Result<(), PresetError> {
    if index < preset.filters.len() {
        Ok(())
    } else {
        Err(PresetError::FilterIndex {
            index,
            len: preset.filters.len(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════════════════════

/// Persisted presets plus the active selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetStore {
    /// Name of the active preset; `None` shows every actor with defaults.
    /// A missing key loads as `None` so a cleared selection survives saving.
    #[serde(default)]
    active: Option<String>,
    #[serde(default, rename = "preset")]
    entries: Vec<ActorFilterPreset>,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self {
            active: Some(DEFAULT_PRESET_NAME.to_string()),
            entries: vec![ActorFilterPreset::new(DEFAULT_PRESET_NAME)],
        }
    }
}

impl PresetStore {
    /// Build a store from loaded presets, restoring the invariants a
    /// hand-edited settings file may break.
    pub fn from_parts(entries: Vec<ActorFilterPreset>, active: Option<String>) -> Self {
        let mut store = Self { active, entries };
        store.normalize();
        store
    }

    /// Ensure at least one preset exists, names are unique and the active
    /// name refers to a stored preset. A dangling active name falls back to
    /// the first preset.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.entries.retain(|preset| {
            let keep = seen.insert(preset.name.clone());
            if !keep {
                warn!(name = %preset.name, "Dropping duplicate preset");
            }
            keep
        });

        if self.entries.is_empty() {
            self.entries.push(ActorFilterPreset::new(DEFAULT_PRESET_NAME));
        }

        if let Some(active) = &self.active
            && self.get(active).is_none()
        {
            warn!(name = %active, "Active preset not found, selecting the first preset");
            self.active = self.entries.first().map(|p| p.name.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorFilterPreset> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ActorFilterPreset> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ActorFilterPreset> {
        self.entries.iter_mut().find(|p| p.name == name)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&ActorFilterPreset> {
        self.active.as_deref().and_then(|name| self.get(name))
    }

    pub fn active_mut(&mut self) -> Option<&mut ActorFilterPreset> {
        let name = self.active.clone()?;
        self.get_mut(&name)
    }

    /// Select a preset by name, or clear the selection with `None`
    pub fn set_active(&mut self, name: Option<&str>) -> Result<(), PresetError> {
        if let Some(name) = name
            && self.get(name).is_none()
        {
            return Err(PresetError::NotFound(name.to_string()));
        }
        self.active = name.map(str::to_string);
        debug!(active = ?self.active, "Active preset changed");
        Ok(())
    }

    fn first_free_name(&self, base: &str, start: usize) -> Option<String> {
        (start..MAX_NAME_SUFFIX)
            .map(|n| format!("{base}#{n}"))
            .find(|name| self.get(name).is_none())
    }

    /// Add an empty preset named `Preset#N` (lowest free N) and select it
    pub fn add_preset(&mut self) -> Option<&ActorFilterPreset> {
        let name = self.first_free_name("Preset", 1)?;
        info!(name = %name, "Added preset");
        self.entries.push(ActorFilterPreset::new(name.clone()));
        self.active = Some(name);
        self.entries.last()
    }

    /// Import an interchange payload.
    ///
    /// Malformed payloads leave the store untouched. Newly added presets
    /// become active.
    pub fn import(
        &mut self,
        text: &str,
        on_conflict: ImportConflict,
    ) -> Result<ImportOutcome, PresetError> {
        let mut imported = parse_preset(text)?;

        let Some(existing) = self.get_mut(&imported.name) else {
            let name = imported.name.clone();
            info!(name = %name, filters = imported.filters.len(), "Imported preset");
            self.entries.push(imported);
            self.active = Some(name.clone());
            return Ok(ImportOutcome::Added(name));
        };

        match on_conflict {
            ImportConflict::Merge => {
                info!(name = %existing.name, filters = imported.filters.len(), "Merged imported preset");
                existing.filters.append(&mut imported.filters);
                Ok(ImportOutcome::Merged(existing.name.clone()))
            }
            ImportConflict::KeepSeparate => {
                let base = match imported.name.rfind('#') {
                    Some(idx) if idx > 0 => &imported.name[..idx],
                    _ => imported.name.as_str(),
                };
                let Some(name) = self.first_free_name(base, 2) else {
                    warn!(name = %imported.name, "No free name for imported preset");
                    return Ok(ImportOutcome::Cancelled);
                };
                info!(from = %imported.name, to = %name, "Imported preset under new name");
                imported.name = name.clone();
                self.entries.push(imported);
                self.active = Some(name.clone());
                Ok(ImportOutcome::Renamed(name))
            }
            ImportConflict::Cancel => Ok(ImportOutcome::Cancelled),
        }
    }

    /// Interchange JSON for one preset
    pub fn export(&self, name: &str) -> Result<String, PresetError> {
        let preset = self
            .get(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        encode_preset(preset)
    }

    /// Remove a preset. Deleting the active preset selects the first
    /// remaining one; deleting the last one recreates the default preset.
    pub fn delete(&mut self, name: &str) -> Result<ActorFilterPreset, PresetError> {
        let index = self
            .entries
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        let removed = self.entries.remove(index);

        if self.entries.is_empty() {
            self.entries.push(ActorFilterPreset::new(DEFAULT_PRESET_NAME));
            self.active = Some(DEFAULT_PRESET_NAME.to_string());
        } else if self.active.as_deref() == Some(name) {
            self.active = self.entries.first().map(|p| p.name.clone());
        }

        info!(name = %name, "Deleted preset");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffradar_types::{ActorType, DisplayMode};

    fn filter(npc_id: u32) -> ActorFilter {
        ActorFilter {
            description: format!("mob {npc_id}"),
            match_type: ActorType::Monster,
            use_match_type: true,
            match_npc_id: npc_id,
            use_match_npc_id: true,
            ..Default::default()
        }
    }

    fn preset(name: &str, ids: &[u32]) -> ActorFilterPreset {
        ActorFilterPreset {
            name: name.to_string(),
            show_only_matching: false,
            filters: ids.iter().map(|id| filter(*id)).collect(),
        }
    }

    fn store_with(presets: Vec<ActorFilterPreset>) -> PresetStore {
        PresetStore::from_parts(presets, None)
    }

    #[test]
    fn test_default_store() {
        let store = PresetStore::default();
        assert_eq!(store.len(), 1);
        let active = store.active().unwrap();
        assert_eq!(active.name, DEFAULT_PRESET_NAME);
        assert!(!active.show_only_matching);
        assert!(active.filters.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut original = preset("Hunt", &[1, 2, 3]);
        original.show_only_matching = true;
        original.filters[1].mode = DisplayMode::WhenCloseAndLookingAt;
        original.filters[2].color = [1, 2, 3];

        let text = encode_preset(&original).unwrap();
        assert_eq!(parse_preset(&text).unwrap(), original);
        assert_eq!(encode_preset(&original).unwrap(), text);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "   ", "[]", "42", "\"Hunt\"", "{not json", r#"{"name":""}"#, r#"{"filters":[]}"#] {
            assert!(
                matches!(parse_preset(text), Err(PresetError::ImportMalformed(_))),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn test_import_new_preset() {
        let mut store = PresetStore::default();
        let text = encode_preset(&preset("Hunt", &[7])).unwrap();

        let outcome = store.import(&text, ImportConflict::Cancel).unwrap();
        assert_eq!(outcome, ImportOutcome::Added("Hunt".to_string()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_name(), Some("Hunt"));
    }

    #[test]
    fn test_import_merge_concatenates() {
        let mut store = store_with(vec![preset("Alpha", &[1, 2])]);
        let text = encode_preset(&preset("Alpha", &[3, 4])).unwrap();

        let outcome = store.import(&text, ImportConflict::Merge).unwrap();
        assert_eq!(outcome, ImportOutcome::Merged("Alpha".to_string()));

        let ids: Vec<u32> = store.get("Alpha").unwrap().filters.iter().map(|f| f.match_npc_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_import_keep_separate_renames() {
        let mut store = store_with(vec![preset("Alpha", &[1])]);
        let text = encode_preset(&preset("Alpha", &[2])).unwrap();

        let outcome = store.import(&text, ImportConflict::KeepSeparate).unwrap();
        assert_eq!(outcome, ImportOutcome::Renamed("Alpha#2".to_string()));
        assert_eq!(store.get("Alpha").unwrap().filters[0].match_npc_id, 1);
        assert_eq!(store.get("Alpha#2").unwrap().filters[0].match_npc_id, 2);

        // Importing `Alpha#2` again strips the suffix and takes the next free slot
        let text = encode_preset(&preset("Alpha#2", &[3])).unwrap();
        let outcome = store.import(&text, ImportConflict::KeepSeparate).unwrap();
        assert_eq!(outcome, ImportOutcome::Renamed("Alpha#3".to_string()));
    }

    #[test]
    fn test_import_keep_separate_leading_hash() {
        let mut store = store_with(vec![preset("#1", &[])]);
        let text = encode_preset(&preset("#1", &[])).unwrap();
        let outcome = store.import(&text, ImportConflict::KeepSeparate).unwrap();
        assert_eq!(outcome, ImportOutcome::Renamed("#1#2".to_string()));
    }

    #[test]
    fn test_import_cancel_and_malformed_leave_store_untouched() {
        let mut store = store_with(vec![preset("Alpha", &[1])]);
        let before = store.clone();

        let text = encode_preset(&preset("Alpha", &[2])).unwrap();
        assert_eq!(
            store.import(&text, ImportConflict::Cancel).unwrap(),
            ImportOutcome::Cancelled
        );
        assert!(store.import("[1,2]", ImportConflict::Merge).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_add_preset_names() {
        let mut store = store_with(vec![preset("Preset#1", &[]), preset("Preset#3", &[])]);
        assert_eq!(store.add_preset().unwrap().name, "Preset#2");
        assert_eq!(store.add_preset().unwrap().name, "Preset#4");
        assert_eq!(store.active_name(), Some("Preset#4"));
    }

    #[test]
    fn test_delete_last_recreates_default() {
        let mut store = store_with(vec![preset("Alpha", &[1])]);
        store.set_active(Some("Alpha")).unwrap();

        let removed = store.delete("Alpha").unwrap();
        assert_eq!(removed.name, "Alpha");
        assert_eq!(store.len(), 1);
        assert_eq!(store.active().unwrap().name, DEFAULT_PRESET_NAME);

        assert!(matches!(store.delete("Alpha"), Err(PresetError::NotFound(_))));
    }

    #[test]
    fn test_delete_active_selects_first_remaining() {
        let mut store = store_with(vec![preset("Alpha", &[]), preset("Beta", &[]), preset("Gamma", &[])]);
        store.set_active(Some("Beta")).unwrap();
        store.delete("Beta").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_name(), Some("Alpha"));

        // Deleting an inactive preset keeps the selection
        store.delete("Gamma").unwrap();
        assert_eq!(store.active_name(), Some("Alpha"));
    }

    #[test]
    fn test_delete_keeps_cleared_selection() {
        let mut store = store_with(vec![preset("Alpha", &[]), preset("Beta", &[])]);
        store.delete("Beta").unwrap();
        assert_eq!(store.active_name(), None);
    }

    #[test]
    fn test_set_active_unknown() {
        let mut store = PresetStore::default();
        assert!(matches!(
            store.set_active(Some("Nope")),
            Err(PresetError::NotFound(_))
        ));
        assert_eq!(store.active_name(), Some(DEFAULT_PRESET_NAME));
        store.set_active(None).unwrap();
        assert!(store.active().is_none());
    }

    #[test]
    fn test_export_unknown() {
        let store = PresetStore::default();
        assert!(store.export(DEFAULT_PRESET_NAME).unwrap().contains("\"name\":\"Default\""));
        assert!(matches!(store.export("Nope"), Err(PresetError::NotFound(_))));
    }

    #[test]
    fn test_from_parts_normalizes() {
        let store = PresetStore::from_parts(
            vec![preset("A", &[1]), preset("A", &[2])],
            Some("Missing".to_string()),
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A").unwrap().filters[0].match_npc_id, 1);
        assert_eq!(store.active_name(), Some("A"));

        let store = PresetStore::from_parts(Vec::new(), None);
        assert_eq!(store.iter().next().unwrap().name, DEFAULT_PRESET_NAME);
    }

    #[test]
    fn test_filter_list_editing() {
        let mut p = preset("Edit", &[1, 2, 3]);
        p.move_filter(0, 2).unwrap();
        let ids: Vec<u32> = p.filters.iter().map(|f| f.match_npc_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        assert_eq!(p.remove_filter(1).unwrap().match_npc_id, 3);
        p.replace_filter(0, filter(9)).unwrap();
        p.push_filter(filter(10));
        let ids: Vec<u32> = p.filters.iter().map(|f| f.match_npc_id).collect();
        assert_eq!(ids, vec![9, 1, 10]);

        assert!(matches!(
            p.remove_filter(3),
            Err(PresetError::FilterIndex { index: 3, len: 3 })
        ));
        assert!(p.move_filter(0, 5).is_err());
    }

    #[test]
    fn test_store_toml_round_trip() {
        let mut store = store_with(vec![preset("Alpha", &[1, 2])]);
        store.set_active(Some("Alpha")).unwrap();

        let text = toml::to_string(&store).unwrap();
        let loaded: PresetStore = toml::from_str(&text).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_store_toml_keeps_cleared_selection() {
        let mut store = store_with(vec![preset("Default", &[]), preset("Beta", &[1])]);
        store.set_active(None).unwrap();

        let text = toml::to_string(&store).unwrap();
        let loaded: PresetStore = toml::from_str(&text).unwrap();
        assert_eq!(loaded.active_name(), None);
        assert_eq!(loaded, store);
    }
}
