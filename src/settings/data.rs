use crate::error::PipelineError;
use crate::pipeline::{FunctionId, FunctionInstance, Pipeline};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Stable handle to a stored function preset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PresetId(pub(crate) u64);

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preset:{}", self.0)
    }
}

/// A named snapshot of one function instance's explicit parameter values,
/// reusable on any instance of the same function type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionPreset {
    pub id: PresetId,
    pub name: String,
    pub type_id: String,
    /// One entry per schema parameter; `None` keeps the schema default.
    pub values: Vec<Option<String>>,
}

impl FunctionPreset {
    pub(crate) fn capture(id: PresetId, name: &str, function: &FunctionInstance) -> Self {
        Self {
            id,
            name: name.to_string(),
            type_id: function.type_id().to_string(),
            values: function
                .bindings()
                .iter()
                .map(|b| b.value().map(str::to_string))
                .collect(),
        }
    }

    /// Restores the snapshot onto `target` through the normal model
    /// operations, so all parameter validation applies. Fails with
    /// `InvalidType` when `target` is an instance of a different type.
    pub fn apply_to(
        &self,
        pipeline: &mut Pipeline,
        target: FunctionId,
    ) -> Result<(), PipelineError> {
        let target_type = pipeline
            .function(target)
            .ok_or(PipelineError::FunctionNotFound { id: target })?
            .type_id()
            .to_string();
        if target_type != self.type_id {
            return Err(PipelineError::InvalidType {
                type_id: self.type_id.clone(),
            });
        }

        for (index, value) in self.values.iter().enumerate() {
            if let Some(value) = value {
                pipeline.set_parameter(target, index, value)?;
            }
        }
        Ok(())
    }
}

/// The structured settings record: one field per known setting plus the
/// preset list. Unknown fields in an older document fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub osmosis_path: Option<PathBuf>,
    pub josm_path: Option<PathBuf>,
    pub language: String,
    pub use_short_task_names: bool,
    pub default_zoom: f64,
    pub presets: Vec<FunctionPreset>,
    pub(crate) next_preset_id: u64,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self {
            osmosis_path: None,
            josm_path: None,
            language: "en".to_string(),
            use_short_task_names: false,
            default_zoom: 1.0,
            presets: Vec::new(),
            next_preset_id: 1,
        }
    }
}

/// Key of one known setting, used to tag change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    OsmosisPath,
    JosmPath,
    Language,
    UseShortTaskNames,
    DefaultZoom,
}

/// Describes exactly what changed in the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    ValueChanged(SettingKey),
    PresetSaved(PresetId),
    PresetDeleted(PresetId),
}
