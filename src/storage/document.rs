//! YAML-backed track document

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::anyhow;

use crate::{domain::track::Document, storage::error::StorageError};

/// Reads and rewrites the whole track document on every call.
///
/// Writers are serialized through `write_lock`; readers never lock and always
/// see either the old or the new file because saves go through a rename.
pub struct DocumentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Missing or blank file means an empty document.
    pub fn load(&self) -> Result<Document, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "document {} does not exist, using an empty one",
                    self.path.to_string_lossy()
                );
                return Ok(Document::default());
            }
            Err(e) => return Err(StorageError::Fs(e)),
        };

        if contents.trim().is_empty() {
            return Ok(Document::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the file with the serialized document.
    pub fn save(&self, document: &Document) -> Result<(), StorageError> {
        let yaml = serde_yaml::to_string(document)
            .map_err(|e| StorageError::Internal(anyhow!("yaml encode: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, yaml)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load, mutate, save while holding the writer lock.
    ///
    /// Nothing is written when `f` fails.
    pub fn modify<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Document) -> Result<T, StorageError>,
    {
        let _guard = self.write_lock.lock().map_err(|e| {
            StorageError::Internal(anyhow!("Could not lock track document for writing: {e}"))
        })?;

        let mut document = self.load()?;
        let result = f(&mut document)?;
        self.save(&document)?;
        Ok(result)
    }
}
