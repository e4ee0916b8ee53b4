use super::{FileContent, FileData, Persistence};
use crate::catalog::Catalog;
use crate::error::FileError;
use crate::parser::{ParserFactory, TextFormat};
use log::info;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Persistence handler for pipeline files in one textual format.
///
/// Serialization is fully delegated to the matching parser; this handler only
/// moves bytes and maps I/O faults to the persistence error taxonomy.
pub struct PipelineFilePersistence {
    format: TextFormat,
    catalog: Arc<Catalog>,
    parsers: Arc<ParserFactory>,
}

impl PipelineFilePersistence {
    pub fn new(format: TextFormat, catalog: Arc<Catalog>, parsers: Arc<ParserFactory>) -> Self {
        Self {
            format,
            catalog,
            parsers,
        }
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }
}

impl Persistence for PipelineFilePersistence {
    fn save(&self, path: &Path, data: FileData<'_>) -> Result<(), FileError> {
        let FileData::Pipeline(pipeline) = data else {
            return Err(FileError::UnsupportedContent {
                expected: "pipeline",
            });
        };

        let parser = self
            .parsers
            .parser(self.format)
            .map_err(|source| FileError::SyntaxProblem {
                path: path.to_path_buf(),
                source,
            })?;

        let mut text = parser.parse_pipeline(pipeline);
        text.push('\n');
        fs::write(path, text).map_err(|source| FileError::NotWritable {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "saved pipeline ({} function(s)) as {} to '{}'",
            pipeline.len(),
            self.format,
            path.display()
        );
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<FileContent, FileError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FileError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FileError::NotReadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let parser = self
            .parsers
            .parser(self.format)
            .map_err(|source| FileError::SyntaxProblem {
                path: path.to_path_buf(),
                source,
            })?;

        let pipeline = parser
            .parse_string(&text, &self.catalog)
            .map_err(|source| FileError::SyntaxProblem {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "loaded pipeline ({} function(s)) as {} from '{}'",
            pipeline.len(),
            self.format,
            path.display()
        );
        Ok(FileContent::Pipeline(pipeline))
    }
}
