use super::{FileContent, FileData, Persistence};
use crate::error::FileError;
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// Persistence handler for the settings document.
///
/// The structured settings record is serialized directly as JSON; no parser
/// is involved. The factory hands out a single shared instance, which makes
/// it the one coordination point for settings I/O.
pub struct SettingsPersistence;

impl SettingsPersistence {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SettingsPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for SettingsPersistence {
    fn save(&self, path: &Path, data: FileData<'_>) -> Result<(), FileError> {
        let FileData::Settings(settings) = data else {
            return Err(FileError::UnsupportedContent {
                expected: "settings",
            });
        };

        let document = serde_json::to_string_pretty(settings).map_err(|e| {
            FileError::NotWritable {
                path: path.to_path_buf(),
                source: io::Error::other(e),
            }
        })?;

        fs::write(path, document).map_err(|source| FileError::NotWritable {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("saved settings to '{}'", path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<FileContent, FileError> {
        let document = fs::read_to_string(path).map_err(|source| {
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

        let settings = serde_json::from_str(&document).map_err(|source| {
            FileError::MalformedSettings {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!("loaded settings from '{}'", path.display());
        Ok(FileContent::Settings(settings))
    }
}
