//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! osmpipe crate. Import this module to get access to the core functionality
//! without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use osmpipe::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! // Load the function catalog and assemble a small pipeline
//! let definitions = std::fs::read_to_string("path/to/catalog.json")?;
//! let catalog = Arc::new(Catalog::from_json(&definitions)?);
//!
//! let mut pipeline = Pipeline::new(catalog.clone());
//! let read = pipeline.add_function("Read")?;
//! let write = pipeline.add_function("Write")?;
//! pipeline.connect(read, 0, write, 0)?;
//!
//! // Export it as a command line
//! let parsers = ParserFactory::new();
//! let command = parsers.parser(TextFormat::Bash)?.parse_pipeline(&pipeline);
//! println!("{command}");
//! # Ok(())
//! # }
//! ```

// Catalog
pub use crate::catalog::{Catalog, FunctionType, ParamType, ParameterSchema};

// Pipeline model
pub use crate::pipeline::{
    Connector, FunctionId, FunctionInstance, ParameterBinding, Pipeline, PipelineEvent, Position,
};

// Parser subsystem
pub use crate::parser::{CommandLineParser, ParserFactory, PipelineParser, TextFormat};

// Persistence subsystem
pub use crate::persistence::{
    FileContent, FileData, FileType, Persistence, PersistenceFactory,
};

// Settings and presets
pub use crate::settings::{
    FunctionPreset, PresetId, SettingKey, Settings, SettingsData, SettingsEvent,
};

// Model facade
pub use crate::model::{ModelEvent, ModelFacade};

// Error types
pub use crate::error::{FileError, ParseError, PipelineError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
