//! Reads and writes named external resources, dispatching by declared file
//! type to the matching format handler.

pub mod pipeline_file;
pub mod settings_file;

pub use pipeline_file::*;
pub use settings_file::*;

use crate::catalog::Catalog;
use crate::error::FileError;
use crate::parser::{ParserFactory, TextFormat};
use crate::pipeline::Pipeline;
use crate::settings::SettingsData;
use ahash::AHashMap;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

/// Declared type of an external resource. Dispatch is driven by this tag,
/// never by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Pipeline as a bash command file.
    Bash,
    /// Pipeline as a Windows cmd command file.
    Cmd,
    /// The settings document.
    Settings,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Bash => "sh",
            FileType::Cmd => "bat",
            FileType::Settings => "json",
        }
    }

    /// The text format a pipeline file of this type is parsed with, `None`
    /// for directly serialized types.
    pub fn text_format(&self) -> Option<TextFormat> {
        match self {
            FileType::Bash => Some(TextFormat::Bash),
            FileType::Cmd => Some(TextFormat::Cmd),
            FileType::Settings => None,
        }
    }

    /// Guesses the file type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "sh" => Some(FileType::Bash),
            "bat" | "cmd" => Some(FileType::Cmd),
            "json" => Some(FileType::Settings),
            _ => None,
        }
    }
}

/// Borrowed payload handed to [`Persistence::save`].
pub enum FileData<'a> {
    Pipeline(&'a Pipeline),
    Settings(&'a SettingsData),
}

/// Owned payload produced by [`Persistence::load`].
#[derive(Debug)]
pub enum FileContent {
    Pipeline(Pipeline),
    Settings(SettingsData),
}

/// Format handler for one kind of external resource.
///
/// Callers never deal with the on-disk encoding: pipeline handlers go through
/// the matching parser, the settings handler serializes the structured record
/// directly.
pub trait Persistence {
    fn save(&self, path: &Path, data: FileData<'_>) -> Result<(), FileError>;
    fn load(&self, path: &Path) -> Result<FileContent, FileError>;
}

/// Creates and caches exactly one handler per [`FileType`].
///
/// Handlers are created lazily on first request and shared afterwards, so
/// each format has a single point of coordination for the lifetime of the
/// factory.
pub struct PersistenceFactory {
    catalog: Arc<Catalog>,
    parsers: Arc<ParserFactory>,
    cache: RefCell<AHashMap<FileType, Rc<dyn Persistence>>>,
}

impl PersistenceFactory {
    pub fn new(catalog: Arc<Catalog>, parsers: Arc<ParserFactory>) -> Self {
        Self {
            catalog,
            parsers,
            cache: RefCell::new(AHashMap::new()),
        }
    }

    /// Returns the shared handler for `file_type`, creating it on first use.
    pub fn handler(&self, file_type: FileType) -> Rc<dyn Persistence> {
        if let Some(handler) = self.cache.borrow().get(&file_type) {
            return handler.clone();
        }

        let handler: Rc<dyn Persistence> = match file_type {
            FileType::Bash => Rc::new(PipelineFilePersistence::new(
                TextFormat::Bash,
                self.catalog.clone(),
                self.parsers.clone(),
            )),
            FileType::Cmd => Rc::new(PipelineFilePersistence::new(
                TextFormat::Cmd,
                self.catalog.clone(),
                self.parsers.clone(),
            )),
            FileType::Settings => Rc::new(SettingsPersistence::new()),
        };

        self.cache
            .borrow_mut()
            .insert(file_type, handler.clone());
        handler
    }
}
