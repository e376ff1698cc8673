use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::platform::{Platform, PlatformLinks};

/// Page name served at `/dashboard`, so it can never be a track id.
pub const RESERVED_ID: &str = "dashboard";

/// Represent a music track, as stored in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub platforms: PlatformLinks,
    #[serde(default)]
    pub track_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hand-written keys this site does not use, kept as-is on save.
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_yaml::Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// The whole persisted collection: tracks in display order plus global links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub global_platforms: PlatformLinks,
}

impl Document {
    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// Checks that `id` can be used both as a URL segment and as a cover file stem.
///
/// `?`, `#` and `%` are refused since they change how a URL path is read.
pub fn is_valid_track_id(id: &str) -> bool {
    !id.is_empty()
        && id != RESERVED_ID
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '?', '#', '%'])
}

/// Fields of a track to be created via the admin surface.
#[derive(Debug, Clone, Default)]
pub struct NewTrack {
    pub id: String,
    pub title: String,
    pub platforms: PlatformLinks,
    pub track_url: String,
    pub description: Option<String>,
}

impl NewTrack {
    /// Admin-created tracks stay hidden until explicitly enabled.
    pub fn into_track(self) -> Track {
        Track {
            id: self.id,
            title: self.title,
            enabled: false,
            platforms: self.platforms,
            track_url: self.track_url,
            description: self.description,
            other: BTreeMap::new(),
        }
    }
}

/// Partial update of a track. `None` keeps the current value,
/// an empty platform link removes it.
#[derive(Debug, Clone, Default)]
pub struct TrackUpdate {
    pub new_id: Option<String>,
    pub title: Option<String>,
    pub platforms: PlatformLinks,
    pub track_url: Option<String>,
    pub description: Option<String>,
}

impl TrackUpdate {
    /// applies all fields except the id; `enabled` is never touched
    pub fn apply(&self, track: &mut Track) {
        if let Some(title) = &self.title {
            track.title = title.clone();
        }
        if let Some(url) = &self.track_url {
            track.track_url = url.clone();
        }
        if let Some(description) = &self.description {
            track.description = (!description.is_empty()).then(|| description.clone());
        }
        for platform in Platform::ALL {
            if let Some(url) = self.platforms.get(platform) {
                track
                    .platforms
                    .set(platform, (!url.is_empty()).then(|| url.to_string()));
            }
        }
    }
}
