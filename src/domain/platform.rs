use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

/// Streaming platforms a track page knows how to link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Vk,
    YandexMusic,
    Spotify,
    AppleMusic,
    YoutubeMusic,
}

impl Platform {
    /// Order in which links are rendered on a track page.
    pub const ALL: [Platform; 5] = [
        Platform::Vk,
        Platform::YandexMusic,
        Platform::Spotify,
        Platform::AppleMusic,
        Platform::YoutubeMusic,
    ];

    /// key used in the YAML document and in admin forms
    pub fn key(self) -> &'static str {
        match self {
            Platform::Vk => "vk",
            Platform::YandexMusic => "yandex_music",
            Platform::Spotify => "spotify",
            Platform::AppleMusic => "apple_music",
            Platform::YoutubeMusic => "youtube_music",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Vk => "VK Music",
            Platform::YandexMusic => "Yandex Music",
            Platform::Spotify => "Spotify",
            Platform::AppleMusic => "Apple Music",
            Platform::YoutubeMusic => "YouTube Music",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Platform links as stored in the document, either per track or global.
///
/// Unknown keys are kept in `other` so that rewriting the document
/// does not lose them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yandex_music: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_music: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_music: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

impl PlatformLinks {
    pub fn get(&self, platform: Platform) -> Option<&str> {
        self.slot(platform).as_deref()
    }

    pub fn set(&mut self, platform: Platform, url: Option<String>) {
        *self.slot_mut(platform) = url;
    }

    fn slot(&self, platform: Platform) -> &Option<String> {
        match platform {
            Platform::Vk => &self.vk,
            Platform::YandexMusic => &self.yandex_music,
            Platform::Spotify => &self.spotify,
            Platform::AppleMusic => &self.apple_music,
            Platform::YoutubeMusic => &self.youtube_music,
        }
    }

    fn slot_mut(&mut self, platform: Platform) -> &mut Option<String> {
        match platform {
            Platform::Vk => &mut self.vk,
            Platform::YandexMusic => &mut self.yandex_music,
            Platform::Spotify => &mut self.spotify,
            Platform::AppleMusic => &mut self.apple_music,
            Platform::YoutubeMusic => &mut self.youtube_music,
        }
    }
}

/// How track links and global links are combined for a track page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformPolicy {
    /// Every platform is present; a missing track link falls back to the global one.
    #[default]
    Fallback,
    /// Only platforms the track itself links to; globals are ignored.
    Strict,
}

/// Resolved links, in [`Platform::ALL`] order.
pub type MergedPlatforms = Vec<(Platform, String)>;

pub fn merge(policy: PlatformPolicy, track: &PlatformLinks, global: &PlatformLinks) -> MergedPlatforms {
    match policy {
        PlatformPolicy::Fallback => Platform::ALL
            .into_iter()
            .map(|p| {
                let url = track
                    .get(p)
                    .filter(|url| !url.is_empty())
                    .or_else(|| global.get(p))
                    .unwrap_or_default();
                (p, url.to_string())
            })
            .collect(),
        PlatformPolicy::Strict => Platform::ALL
            .into_iter()
            .filter_map(|p| {
                let url = track.get(p)?.trim();
                (!url.is_empty()).then(|| (p, url.to_string()))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(pairs: &[(Platform, &str)]) -> PlatformLinks {
        let mut links = PlatformLinks::default();
        for (p, url) in pairs {
            links.set(*p, Some(url.to_string()));
        }
        links
    }

    fn lookup(merged: &MergedPlatforms, platform: Platform) -> Option<&str> {
        merged
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, url)| url.as_str())
    }

    #[test]
    fn fallback_prefers_track_link_over_global() {
        let track = links(&[(Platform::Spotify, "https://open.spotify.com/track/1")]);
        let global = links(&[
            (Platform::Spotify, "https://open.spotify.com/artist/me"),
            (Platform::Vk, "https://vk.com/me"),
        ]);

        let merged = merge(PlatformPolicy::Fallback, &track, &global);

        assert_eq!(merged.len(), 5);
        assert_eq!(
            lookup(&merged, Platform::Spotify),
            Some("https://open.spotify.com/track/1")
        );
        assert_eq!(lookup(&merged, Platform::Vk), Some("https://vk.com/me"));
        assert_eq!(lookup(&merged, Platform::AppleMusic), Some(""));
    }

    #[test]
    fn fallback_treats_empty_track_link_as_missing() {
        let track = links(&[(Platform::Vk, "")]);
        let global = links(&[(Platform::Vk, "https://vk.com/me")]);

        let merged = merge(PlatformPolicy::Fallback, &track, &global);

        assert_eq!(lookup(&merged, Platform::Vk), Some("https://vk.com/me"));
    }

    #[test]
    fn strict_ignores_globals_and_blank_links() {
        let track = links(&[
            (Platform::YandexMusic, "  https://music.yandex.ru/album/1  "),
            (Platform::Vk, "   "),
        ]);
        let global = links(&[(Platform::Spotify, "https://open.spotify.com/artist/me")]);

        let merged = merge(PlatformPolicy::Strict, &track, &global);

        assert_eq!(
            merged,
            vec![(
                Platform::YandexMusic,
                "https://music.yandex.ru/album/1".to_string()
            )]
        );
    }

    #[test]
    fn merged_output_follows_platform_order() {
        let track = links(&[
            (Platform::YoutubeMusic, "yt"),
            (Platform::Vk, "vk"),
            (Platform::Spotify, "sp"),
        ]);

        let merged = merge(PlatformPolicy::Strict, &track, &PlatformLinks::default());
        let order: Vec<_> = merged.iter().map(|(p, _)| *p).collect();

        assert_eq!(
            order,
            vec![Platform::Vk, Platform::Spotify, Platform::YoutubeMusic]
        );
    }

    #[test]
    fn unknown_keys_survive_yaml_round_trip() -> anyhow::Result<()> {
        let yaml = "vk: https://vk.com/x\nsoundcloud: https://soundcloud.com/x\n";

        let parsed: PlatformLinks = serde_yaml::from_str(yaml)?;
        assert_eq!(parsed.get(Platform::Vk), Some("https://vk.com/x"));
        assert_eq!(
            parsed.other.get("soundcloud").map(String::as_str),
            Some("https://soundcloud.com/x")
        );

        let again: PlatformLinks = serde_yaml::from_str(&serde_yaml::to_string(&parsed)?)?;
        assert_eq!(again, parsed);
        Ok(())
    }
}
