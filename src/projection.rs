//! Views of the track document rendered by the site pages

use crate::{
    config::SiteConfig,
    domain::{
        platform::{MergedPlatforms, PlatformPolicy, merge},
        track::Document,
    },
    storage::covers::{CoverDir, public_url},
};

/// One tile on the home page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCard {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// empty when the track has no cover
    pub cover_url: String,
    pub has_cover: bool,
}

/// Everything the track page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPage {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub has_cover: bool,
    pub track_url: String,
    pub description: String,
    pub platforms: MergedPlatforms,
}

/// A row of the admin dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRow {
    pub id: String,
    pub title: String,
    pub enabled: bool,
    pub cover_url: String,
    pub has_cover: bool,
}

fn resolve_cover(covers: &CoverDir, id: &str) -> Option<String> {
    covers.find(id).map(|name| public_url(&name))
}

/// Home page tracks, most recently appended first.
pub fn list_view(doc: &Document, covers: &CoverDir, site: &SiteConfig) -> Vec<TrackCard> {
    let filter_disabled = site.filter_disabled_in_list();

    doc.tracks
        .iter()
        .rev()
        .filter(|t| !filter_disabled || t.enabled)
        .map(|t| {
            let cover = resolve_cover(covers, &t.id);
            TrackCard {
                id: t.id.clone(),
                title: t.title.clone(),
                artist: site.default_artist.clone(),
                has_cover: cover.is_some(),
                cover_url: cover.unwrap_or_default(),
            }
        })
        .collect()
}

/// Track page for `id`, or `None` when it should answer "not found".
///
/// Disabled tracks are only hidden under the strict policy.
pub fn detail_view(
    doc: &Document,
    id: &str,
    covers: &CoverDir,
    site: &SiteConfig,
) -> Option<TrackPage> {
    let track = doc.get(id)?;
    if site.platform_policy == PlatformPolicy::Strict && !track.enabled {
        return None;
    }

    let cover = resolve_cover(covers, &track.id);
    Some(TrackPage {
        id: track.id.clone(),
        title: track.title.clone(),
        artist: site.default_artist.clone(),
        has_cover: cover.is_some(),
        cover_url: cover.unwrap_or_else(|| site.placeholder_cover_url.clone()),
        track_url: track.track_url.clone(),
        description: track.description.clone().unwrap_or_default(),
        platforms: merge(
            site.platform_policy,
            &track.platforms,
            &doc.global_platforms,
        ),
    })
}

pub fn dashboard_view(doc: &Document, covers: &CoverDir) -> Vec<DashboardRow> {
    doc.tracks
        .iter()
        .map(|t| {
            let cover = resolve_cover(covers, &t.id);
            DashboardRow {
                id: t.id.clone(),
                title: t.title.clone(),
                enabled: t.enabled,
                has_cover: cover.is_some(),
                cover_url: cover.unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::domain::{
        platform::{Platform, PlatformLinks},
        track::Track,
    };

    fn site(policy: PlatformPolicy) -> SiteConfig {
        SiteConfig {
            platform_policy: policy,
            ..Default::default()
        }
    }

    fn track(id: &str, enabled: bool) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_uppercase(),
            enabled,
            platforms: PlatformLinks::default(),
            track_url: format!("https://cdn.example/{id}.mp3"),
            description: None,
            other: Default::default(),
        }
    }

    fn doc(tracks: Vec<Track>) -> Document {
        Document {
            tracks,
            global_platforms: PlatformLinks::default(),
        }
    }

    fn ids(cards: &[TrackCard]) -> Vec<&str> {
        cards.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn list_is_reverse_document_order() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path());
        let doc = doc(vec![track("t1", true), track("t2", true), track("t3", true)]);

        let cards = list_view(&doc, &covers, &site(PlatformPolicy::Fallback));

        assert_eq!(ids(&cards), vec!["t3", "t2", "t1"]);
        assert!(cards.iter().all(|c| c.artist == "meowthpxnk"));
    }

    #[test]
    fn list_filtering_follows_config() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path());
        let doc = doc(vec![track("on", true), track("off", false)]);

        let fallback = list_view(&doc, &covers, &site(PlatformPolicy::Fallback));
        assert_eq!(ids(&fallback), vec!["off", "on"]);

        let strict = list_view(&doc, &covers, &site(PlatformPolicy::Strict));
        assert_eq!(ids(&strict), vec!["on"]);

        let forced = SiteConfig {
            filter_disabled_in_list: Some(true),
            ..site(PlatformPolicy::Fallback)
        };
        assert_eq!(ids(&list_view(&doc, &covers, &forced)), vec!["on"]);
    }

    #[test]
    fn list_cover_url_is_empty_without_cover() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("with.jpg"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());
        let doc = doc(vec![track("with", true), track("without", true)]);

        let cards = list_view(&doc, &covers, &site(PlatformPolicy::Fallback));

        assert_eq!(cards[0].cover_url, "");
        assert!(!cards[0].has_cover);
        assert_eq!(cards[1].cover_url, "/covers/with.jpg");
        assert!(cards[1].has_cover);
    }

    #[test]
    fn detail_uses_placeholder_and_fallback_links() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path());
        let mut t = track("song", true);
        t.platforms
            .set(Platform::Vk, Some("https://vk.com/song".into()));
        let mut doc = doc(vec![t]);
        doc.global_platforms
            .set(Platform::Vk, Some("https://vk.com/artist".into()));
        doc.global_platforms
            .set(Platform::Spotify, Some("https://spotify/artist".into()));

        let page = detail_view(&doc, "song", &covers, &site(PlatformPolicy::Fallback)).unwrap();

        assert_eq!(page.title, "SONG");
        assert_eq!(page.cover_url, "https://via.placeholder.com/500x500");
        assert!(!page.has_cover);
        assert_eq!(page.description, "");
        assert_eq!(page.platforms.len(), 5);
        assert!(page
            .platforms
            .contains(&(Platform::Vk, "https://vk.com/song".to_string())));
        assert!(page
            .platforms
            .contains(&(Platform::Spotify, "https://spotify/artist".to_string())));
    }

    #[test]
    fn detail_strict_omits_missing_links() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("song.png"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());
        let mut doc = doc(vec![track("song", true)]);
        doc.global_platforms
            .set(Platform::Spotify, Some("https://spotify/artist".into()));

        let page = detail_view(&doc, "song", &covers, &site(PlatformPolicy::Strict)).unwrap();

        assert!(page.platforms.is_empty());
        assert_eq!(page.cover_url, "/covers/song.png");
        assert!(page.has_cover);
    }

    #[test]
    fn detail_hides_disabled_tracks_only_under_strict() {
        let tmp = TempDir::new().unwrap();
        let covers = CoverDir::new(tmp.path());
        let doc = doc(vec![track("off", false)]);

        assert!(detail_view(&doc, "off", &covers, &site(PlatformPolicy::Strict)).is_none());
        assert!(detail_view(&doc, "off", &covers, &site(PlatformPolicy::Fallback)).is_some());
        assert!(detail_view(&doc, "missing", &covers, &site(PlatformPolicy::Fallback)).is_none());
    }

    #[test]
    fn dashboard_keeps_document_order_and_disabled_tracks() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.webp"), b"x").unwrap();
        let covers = CoverDir::new(tmp.path());
        let doc = doc(vec![track("a", true), track("b", false)]);

        let rows = dashboard_view(&doc, &covers);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "a");
        assert!(!rows[0].has_cover);
        assert_eq!(rows[1].id, "b");
        assert!(!rows[1].enabled);
        assert_eq!(rows[1].cover_url, "/covers/b.webp");
    }
}
