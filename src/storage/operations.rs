use crate::{
    config::StorageConfig,
    domain::track::{Document, NewTrack, Track, TrackUpdate, is_valid_track_id},
    storage::{
        covers::{CoverDir, CoverUpload, cover_extension},
        document::DocumentStore,
        error::StorageError,
    },
};

/// Main structure that implements all storage logic:
/// the track document plus the cover files that belong to it.
pub struct Catalog {
    pub(crate) store: DocumentStore,
    pub(crate) covers: CoverDir,
}

impl Catalog {
    pub fn new(config: &StorageConfig) -> Self {
        Self::from_parts(
            DocumentStore::new(&config.document),
            CoverDir::new(&config.covers_dir),
        )
    }

    pub fn from_parts(store: DocumentStore, covers: CoverDir) -> Self {
        Self { store, covers }
    }

    pub fn covers(&self) -> &CoverDir {
        &self.covers
    }

    pub fn document(&self) -> Result<Document, StorageError> {
        self.store.load()
    }

    pub fn list_tracks(&self) -> Result<Vec<Track>, StorageError> {
        Ok(self.store.load()?.tracks)
    }

    pub fn get_track(&self, id: &str) -> Result<Track, StorageError> {
        self.store
            .load()?
            .tracks
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StorageError::TrackNotFound(id.to_string()))
    }

    /// Appends a new, disabled track and stores its cover if one was uploaded.
    pub fn create_track(
        &self,
        new: NewTrack,
        cover: Option<&CoverUpload>,
    ) -> Result<Track, StorageError> {
        if !is_valid_track_id(&new.id) {
            return Err(StorageError::InvalidTrackId(new.id));
        }

        let track = self.store.modify(|doc| {
            if doc.contains(&new.id) {
                return Err(StorageError::TrackExists(new.id.clone()));
            }
            let track = new.into_track();
            doc.tracks.push(track.clone());
            Ok(track)
        })?;

        if let Some(upload) = cover.filter(|c| !c.is_empty()) {
            self.covers
                .store(&track.id, upload)
                .map_err(|e| saved_without_cover(&track.id, e))?;
        }

        log::info!("created track {}", track.id);
        Ok(track)
    }

    /// Updates the fields of an existing track, optionally renaming it.
    ///
    /// A rename moves the existing cover along; a supported upload then
    /// replaces every cover file of the track.
    pub fn update_track(
        &self,
        id: &str,
        update: TrackUpdate,
        cover: Option<&CoverUpload>,
    ) -> Result<Track, StorageError> {
        let target_id = update
            .new_id
            .clone()
            .filter(|new_id| !new_id.is_empty())
            .unwrap_or_else(|| id.to_string());

        if target_id != id && !is_valid_track_id(&target_id) {
            return Err(StorageError::InvalidTrackId(target_id));
        }

        let track = self.store.modify(|doc| {
            if !doc.contains(id) {
                return Err(StorageError::TrackNotFound(id.to_string()));
            }
            if target_id != id && doc.contains(&target_id) {
                return Err(StorageError::TrackExists(target_id.clone()));
            }

            let track = doc
                .get_mut(id)
                .ok_or_else(|| StorageError::TrackNotFound(id.to_string()))?;
            update.apply(track);
            track.id = target_id.clone();
            Ok(track.clone())
        })?;

        self.update_covers(id, &target_id, cover)
            .map_err(|e| saved_without_cover(&target_id, e))?;

        log::info!("updated track {target_id}");
        Ok(track)
    }

    fn update_covers(
        &self,
        id: &str,
        target_id: &str,
        cover: Option<&CoverUpload>,
    ) -> Result<(), StorageError> {
        if target_id != id {
            // leftovers of an earlier track with the new id would shadow the moved cover
            let stale = self.covers.remove_all(target_id)?;
            if stale > 0 {
                log::warn!("removed {stale} stale cover file(s) of {target_id}");
            }
            self.covers.rename(id, target_id)?;
            log::info!("renamed track {id} -> {target_id}");
        }

        if let Some(upload) = cover.filter(|c| !c.is_empty()) {
            if cover_extension(&upload.filename).is_some() {
                self.covers.remove_all(target_id)?;
            }
            self.covers.store(target_id, upload)?;
        }
        Ok(())
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<Track, StorageError> {
        let track = self.store.modify(|doc| {
            let track = doc
                .get_mut(id)
                .ok_or_else(|| StorageError::TrackNotFound(id.to_string()))?;
            track.enabled = enabled;
            Ok(track.clone())
        })?;

        log::info!(
            "track {id} {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(track)
    }

    /// Removes the track and its cover. Deleting an unknown id is not an error.
    pub fn delete_track(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.store.modify(|doc| {
            let before = doc.tracks.len();
            doc.tracks.retain(|t| t.id != id);
            Ok(doc.tracks.len() != before)
        })?;

        self.covers.remove_first(id)?;

        if removed {
            log::info!("deleted track {id}");
        } else {
            log::debug!("delete of unknown track {id}, nothing to do");
        }
        Ok(removed)
    }
}

/// Cover files are written after the document is saved, so a failure here
/// leaves the track saved with whatever cover it had before.
fn saved_without_cover(id: &str, e: StorageError) -> StorageError {
    log::error!("track {id} was saved but its cover could not be updated: {e}");
    e
}
