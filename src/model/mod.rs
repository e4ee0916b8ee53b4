//! The model facade: single owner of catalog, pipeline and settings, and the
//! one notification fan-out point external consumers subscribe to.

use crate::catalog::Catalog;
use crate::error::{FileError, ParseError, PipelineError};
use crate::parser::{ParserFactory, TextFormat};
use crate::persistence::{FileContent, FileData, FileType, PersistenceFactory};
use crate::pipeline::{FunctionId, Pipeline, PipelineEvent};
use crate::settings::{FunctionPreset, PresetId, Settings, SettingsEvent};
use log::warn;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// A change notification, tagged with the surface it originated from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    Pipeline(PipelineEvent),
    Settings(SettingsEvent),
}

type Listener = Box<dyn FnMut(&ModelEvent)>;

/// Coordination point over the three model surfaces: the read-only catalog,
/// the pipeline and the settings store.
///
/// Every change notification from the underlying components is forwarded to
/// the facade's subscribers as a surface-tagged [`ModelEvent`]. The settings
/// persistence handler is wired up at construction so every settings change
/// is durably saved; a failed auto-save is logged and never re-notified.
pub struct ModelFacade {
    catalog: Arc<Catalog>,
    pipeline: Pipeline,
    settings: Settings,
    parsers: Arc<ParserFactory>,
    persistences: PersistenceFactory,
    settings_path: PathBuf,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl ModelFacade {
    /// Builds the facade, bootstrapping the settings document at
    /// `settings_path` (an absent file is created with defaults before the
    /// first read).
    pub fn new(catalog: Arc<Catalog>, settings_path: PathBuf) -> Result<Self, FileError> {
        let parsers = Arc::new(ParserFactory::new());
        let persistences = PersistenceFactory::new(catalog.clone(), parsers.clone());
        let listeners: Rc<RefCell<Vec<Listener>>> = Rc::new(RefCell::new(Vec::new()));

        let mut pipeline = Pipeline::new(catalog.clone());
        {
            let listeners = listeners.clone();
            pipeline.subscribe(move |event| {
                let event = ModelEvent::Pipeline(event.clone());
                for listener in listeners.borrow_mut().iter_mut() {
                    listener(&event);
                }
            });
        }

        let mut settings = Settings::new();
        {
            let listeners = listeners.clone();
            settings.subscribe(move |event, _| {
                let event = ModelEvent::Settings(event.clone());
                for listener in listeners.borrow_mut().iter_mut() {
                    listener(&event);
                }
            });
        }
        {
            let handler = persistences.handler(FileType::Settings);
            let path = settings_path.clone();
            settings.subscribe(move |_, snapshot| {
                if let Err(e) = handler.save(&path, FileData::Settings(snapshot)) {
                    warn!("failed to persist settings to '{}': {e}", path.display());
                }
            });
        }

        settings.initialize(
            persistences.handler(FileType::Settings).as_ref(),
            &settings_path,
        )?;

        Ok(Self {
            catalog,
            pipeline,
            settings,
            parsers,
            persistences,
            settings_path,
            listeners,
        })
    }

    /// Registers a subscriber for all model change notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&ModelEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn parsers(&self) -> &ParserFactory {
        &self.parsers
    }

    pub fn persistences(&self) -> &PersistenceFactory {
        &self.persistences
    }

    /// Discards the edited pipeline.
    pub fn new_pipeline(&mut self) {
        self.pipeline.clear();
    }

    /// Saves the pipeline to `path` in the given file type's format and
    /// records the successful save on the pipeline.
    pub fn save_pipeline(&mut self, path: &Path, file_type: FileType) -> Result<(), FileError> {
        let handler = self.persistences.handler(file_type);
        handler.save(path, FileData::Pipeline(&self.pipeline))?;
        self.pipeline.mark_saved(path);
        Ok(())
    }

    /// Loads a pipeline file and replaces the edited pipeline with it,
    /// keeping all subscriptions.
    pub fn load_pipeline(&mut self, path: &Path, file_type: FileType) -> Result<(), FileError> {
        let handler = self.persistences.handler(file_type);
        match handler.load(path)? {
            FileContent::Pipeline(mut loaded) => {
                loaded.mark_saved(path);
                self.pipeline.adopt(loaded);
                Ok(())
            }
            FileContent::Settings(_) => Err(FileError::UnsupportedContent {
                expected: "pipeline",
            }),
        }
    }

    /// Renders the pipeline as text in the given format, e.g. for the
    /// export-to-clipboard path.
    pub fn export_pipeline(&self, format: TextFormat) -> Result<String, ParseError> {
        let parser = self.parsers.parser(format)?;
        Ok(parser.parse_pipeline(&self.pipeline))
    }

    /// Captures a function's current parameter values as a named preset.
    pub fn save_preset(
        &mut self,
        name: &str,
        function: FunctionId,
    ) -> Result<PresetId, PipelineError> {
        let instance = self
            .pipeline
            .function(function)
            .ok_or(PipelineError::FunctionNotFound { id: function })?;
        Ok(self.settings.save_preset(name, instance))
    }

    pub fn presets_for(&self, type_id: &str) -> Vec<&FunctionPreset> {
        self.settings.presets_for(type_id)
    }

    pub fn delete_preset(&mut self, id: PresetId) -> bool {
        self.settings.delete_preset(id)
    }

    /// Applies a stored preset to a function instance. Returns `Ok(false)`
    /// when the preset id is unknown.
    pub fn apply_preset(
        &mut self,
        preset: PresetId,
        target: FunctionId,
    ) -> Result<bool, PipelineError> {
        let Some(preset) = self.settings.preset(preset) else {
            return Ok(false);
        };
        let preset = preset.clone();
        preset.apply_to(&mut self.pipeline, target)?;
        Ok(true)
    }
}
