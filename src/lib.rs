//! # Osmpipe - Pipeline Assembly Core
//!
//! **Osmpipe** is the data-model core for visually assembled OSM-data-processing
//! command pipelines. It keeps the pipeline as a directed acyclic graph of
//! configured function instances, converts that graph to and from a textual
//! command representation, and dispatches save/load requests to the matching
//! format handler.
//!
//! ## Core Workflow
//!
//! The crate operates on a read-only **catalog** of function types (loaded
//! from an external definition source at startup) and a mutable **pipeline**
//! graph edited through it:
//!
//! 1.  **Load the catalog**: deserialize the function-type definitions with
//!     [`Catalog::from_json`](catalog::Catalog::from_json).
//! 2.  **Edit the pipeline**: add function instances, connect their slots and
//!     set parameter values through the [`Pipeline`](pipeline::Pipeline) API.
//!     Every mutation is validated against the catalog schemas, is atomic,
//!     and notifies listeners with a typed event.
//! 3.  **Export or persist**: render the graph as an executable command line
//!     through a [`PipelineParser`](parser::PipelineParser), or go through the
//!     [`PersistenceFactory`](persistence::PersistenceFactory) to write and
//!     read pipeline files and the settings document.
//!
//! The [`ModelFacade`](model::ModelFacade) bundles all of the above behind a
//! single owner with one notification fan-out point.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use osmpipe::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let definitions = std::fs::read_to_string("catalog.json")?;
//!     let catalog = Arc::new(Catalog::from_json(&definitions)?);
//!
//!     let mut model = ModelFacade::new(catalog, "settings.json".into())?;
//!     model.subscribe(|event| println!("changed: {event:?}"));
//!
//!     let read = model.pipeline_mut().add_function("Read")?;
//!     let write = model.pipeline_mut().add_function("Write")?;
//!     model.pipeline_mut().connect(read, 0, write, 0)?;
//!     model.pipeline_mut().set_parameter(read, 0, "input.osm")?;
//!
//!     // Export as an executable command line ...
//!     println!("{}", model.export_pipeline(TextFormat::Bash)?);
//!
//!     // ... or save it as a command file for later editing.
//!     model.save_pipeline(Path::new("pipeline.sh"), FileType::Bash)?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod model;
pub mod parser;
pub mod persistence;
pub mod pipeline;
pub mod prelude;
pub mod settings;
