use super::data::{FunctionPreset, PresetId, SettingKey, SettingsData, SettingsEvent};
use crate::error::FileError;
use crate::persistence::{FileContent, FileData, Persistence};
use crate::pipeline::FunctionInstance;
use std::path::{Path, PathBuf};

type Listener = Box<dyn FnMut(&SettingsEvent, &SettingsData)>;

/// The in-memory settings store.
///
/// Every mutation notifies listeners synchronously with the event and a
/// snapshot of the full record, which is what lets the persistence layer save
/// on change without this store knowing about I/O.
pub struct Settings {
    data: SettingsData,
    listeners: Vec<Listener>,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            data: SettingsData::default(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SettingsEvent, &SettingsData) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: SettingsEvent) {
        let snapshot = self.data.clone();
        for listener in &mut self.listeners {
            listener(&event, &snapshot);
        }
    }

    /// Loads the settings document from `path` through the given handler.
    /// When no document exists yet, the current (default) record is saved
    /// first, then read back.
    pub fn initialize(
        &mut self,
        handler: &dyn Persistence,
        path: &Path,
    ) -> Result<(), FileError> {
        if !path.exists() {
            handler.save(path, FileData::Settings(&self.data))?;
        }
        match handler.load(path)? {
            FileContent::Settings(data) => {
                self.data = data;
                Ok(())
            }
            FileContent::Pipeline(_) => Err(FileError::UnsupportedContent {
                expected: "settings",
            }),
        }
    }

    pub fn data(&self) -> &SettingsData {
        &self.data
    }

    pub fn osmosis_path(&self) -> Option<&Path> {
        self.data.osmosis_path.as_deref()
    }

    pub fn set_osmosis_path(&mut self, path: Option<PathBuf>) {
        self.data.osmosis_path = path;
        self.notify(SettingsEvent::ValueChanged(SettingKey::OsmosisPath));
    }

    pub fn josm_path(&self) -> Option<&Path> {
        self.data.josm_path.as_deref()
    }

    pub fn set_josm_path(&mut self, path: Option<PathBuf>) {
        self.data.josm_path = path;
        self.notify(SettingsEvent::ValueChanged(SettingKey::JosmPath));
    }

    pub fn language(&self) -> &str {
        &self.data.language
    }

    pub fn set_language(&mut self, language: &str) {
        self.data.language = language.to_string();
        self.notify(SettingsEvent::ValueChanged(SettingKey::Language));
    }

    pub fn use_short_task_names(&self) -> bool {
        self.data.use_short_task_names
    }

    pub fn set_use_short_task_names(&mut self, value: bool) {
        self.data.use_short_task_names = value;
        self.notify(SettingsEvent::ValueChanged(SettingKey::UseShortTaskNames));
    }

    pub fn default_zoom(&self) -> f64 {
        self.data.default_zoom
    }

    pub fn set_default_zoom(&mut self, zoom: f64) {
        self.data.default_zoom = zoom;
        self.notify(SettingsEvent::ValueChanged(SettingKey::DefaultZoom));
    }

    /// Captures the explicit parameter values of `function` as a new named
    /// preset.
    pub fn save_preset(&mut self, name: &str, function: &FunctionInstance) -> PresetId {
        let id = PresetId(self.data.next_preset_id);
        self.data.next_preset_id += 1;
        self.data
            .presets
            .push(FunctionPreset::capture(id, name, function));
        self.notify(SettingsEvent::PresetSaved(id));
        id
    }

    pub fn preset(&self, id: PresetId) -> Option<&FunctionPreset> {
        self.data.presets.iter().find(|p| p.id == id)
    }

    /// All presets captured from the given function type.
    pub fn presets_for(&self, type_id: &str) -> Vec<&FunctionPreset> {
        self.data
            .presets
            .iter()
            .filter(|p| p.type_id == type_id)
            .collect()
    }

    /// Deletes a preset by id. Returns `false`, leaving the list untouched,
    /// when no preset carries the id.
    pub fn delete_preset(&mut self, id: PresetId) -> bool {
        match self.data.presets.iter().position(|p| p.id == id) {
            Some(index) => {
                self.data.presets.remove(index);
                self.notify(SettingsEvent::PresetDeleted(id));
                true
            }
            None => false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}
