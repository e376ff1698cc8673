use rouille::{Request, Response, input::post::BufferedFile};
use log::info;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    config::{HttpConfig, SiteConfig},
    domain::{
        platform::{Platform, PlatformLinks},
        track::{NewTrack, TrackUpdate},
    },
    http::{error::ApiError, pages},
    projection,
    storage::{covers::CoverUpload, error::StorageError, operations::Catalog},
};

pub struct HttpServer {
    catalog: Arc<Catalog>,
    site: SiteConfig,
    assets_dir: PathBuf,
    pub config: HttpConfig,
}

/// Form fields shared by create and update
struct TrackForm {
    title: Option<String>,
    track_url: Option<String>,
    description: Option<String>,
    platforms: PlatformLinks,
    cover: Option<CoverUpload>,
}

fn platform_links(fields: [Option<String>; 5]) -> PlatformLinks {
    let mut links = PlatformLinks::default();
    for (platform, url) in Platform::ALL.into_iter().zip(fields) {
        links.set(platform, url);
    }
    links
}

fn cover_upload(file: Option<BufferedFile>) -> Option<CoverUpload> {
    file.map(|f| CoverUpload {
        filename: f.filename.unwrap_or_default(),
        data: f.data,
    })
}

/// HTML checkboxes and JS both send one of these.
fn parse_enabled(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl HttpServer {
    pub fn new(catalog: Catalog, site: SiteConfig, assets_dir: PathBuf, config: HttpConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            site,
            assets_dir,
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = if let Some(assets) = request.remove_prefix("/static") {
            rouille::match_assets(&assets, &self.assets_dir)
        } else {
            rouille::router!(request,
                (GET) (/) => {
                    self.respond(self.handle_home())
                },
                (GET) (/dashboard) => {
                    self.respond(self.handle_dashboard())
                },
                (GET) (/api/tracks) => {
                    self.respond(self.handle_list_tracks())
                },
                (POST) (/api/tracks) => {
                    self.respond(self.handle_create_track(request))
                },
                (GET) (/api/tracks/{id: String}) => {
                    self.respond(self.handle_get_track(&id))
                },
                (PUT) (/api/tracks/{id: String}) => {
                    self.respond(self.handle_update_track(&id, request))
                },
                (DELETE) (/api/tracks/{id: String}) => {
                    self.respond(self.handle_delete_track(&id))
                },
                (PATCH) (/api/tracks/{id: String}/toggle) => {
                    self.respond(self.handle_toggle_track(&id, request))
                },
                (GET) (/covers/{file: String}) => {
                    self.handle_cover(&file)
                },
                (GET) (/{id: String}) => {
                    self.respond(self.handle_track_page(&id))
                },
                _ => Response::empty_404()
            )
        };

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn respond(&self, result: Result<Response, ApiError>) -> Response {
        match result {
            Ok(r) => r,
            Err(e) => e.into_response(),
        }
    }

    fn handle_home(&self) -> Result<Response, ApiError> {
        let doc = self.catalog.document()?;
        let cards = projection::list_view(&doc, self.catalog.covers(), &self.site);
        Ok(pages::tracks_list(&self.site.default_artist, &cards))
    }

    fn handle_dashboard(&self) -> Result<Response, ApiError> {
        let doc = self.catalog.document()?;
        let rows = projection::dashboard_view(&doc, self.catalog.covers());
        Ok(pages::dashboard(&rows))
    }

    fn handle_track_page(&self, id: &str) -> Result<Response, ApiError> {
        let doc = self.catalog.document()?;
        match projection::detail_view(&doc, id, self.catalog.covers(), &self.site) {
            Some(page) => Ok(pages::track_page(&page)),
            None => Ok(pages::not_found(id)),
        }
    }

    fn handle_list_tracks(&self) -> Result<Response, ApiError> {
        Ok(Response::json(&self.catalog.list_tracks()?))
    }

    fn handle_get_track(&self, id: &str) -> Result<Response, ApiError> {
        Ok(Response::json(&self.catalog.get_track(id)?))
    }

    fn handle_create_track(&self, request: &Request) -> Result<Response, ApiError> {
        let input = rouille::post_input!(request, {
            id: String,
            title: String,
            track_url: Option<String>,
            description: Option<String>,
            vk: Option<String>,
            yandex_music: Option<String>,
            spotify: Option<String>,
            apple_music: Option<String>,
            youtube_music: Option<String>,
            cover: Option<BufferedFile>,
        })?;

        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let new = NewTrack {
            id: input.id.trim().to_string(),
            title: input.title,
            platforms: platform_links([
                non_empty(input.vk),
                non_empty(input.yandex_music),
                non_empty(input.spotify),
                non_empty(input.apple_music),
                non_empty(input.youtube_music),
            ]),
            track_url: input.track_url.unwrap_or_default(),
            description: non_empty(input.description),
        };
        let cover = cover_upload(input.cover);

        let track = self.catalog.create_track(new, cover.as_ref())?;
        Ok(Response::json(&track).with_status_code(201))
    }

    fn read_update_form(request: &Request) -> Result<(Option<String>, TrackForm), ApiError> {
        let input = rouille::post_input!(request, {
            new_id: Option<String>,
            title: Option<String>,
            track_url: Option<String>,
            description: Option<String>,
            vk: Option<String>,
            yandex_music: Option<String>,
            spotify: Option<String>,
            apple_music: Option<String>,
            youtube_music: Option<String>,
            cover: Option<BufferedFile>,
        })?;

        Ok((
            input.new_id.map(|id| id.trim().to_string()),
            TrackForm {
                title: input.title,
                track_url: input.track_url,
                description: input.description,
                platforms: platform_links([
                    input.vk,
                    input.yandex_music,
                    input.spotify,
                    input.apple_music,
                    input.youtube_music,
                ]),
                cover: cover_upload(input.cover),
            },
        ))
    }

    fn handle_update_track(&self, id: &str, request: &Request) -> Result<Response, ApiError> {
        let (new_id, form) = Self::read_update_form(request)?;
        let update = TrackUpdate {
            new_id,
            title: form.title,
            platforms: form.platforms,
            track_url: form.track_url,
            description: form.description,
        };

        let track = self
            .catalog
            .update_track(id, update, form.cover.as_ref())?;
        Ok(Response::json(&track))
    }

    fn handle_toggle_track(&self, id: &str, request: &Request) -> Result<Response, ApiError> {
        let input = rouille::post_input!(request, { enabled: String })?;
        let enabled = parse_enabled(&input.enabled).ok_or_else(|| {
            ApiError::BadRequest(format!("invalid enabled value {:?}", input.enabled))
        })?;

        let track = self.catalog.set_enabled(id, enabled)?;
        Ok(Response::json(&track))
    }

    fn handle_delete_track(&self, id: &str) -> Result<Response, ApiError> {
        self.catalog.delete_track(id)?;
        Ok(Response::empty_204())
    }

    fn handle_cover(&self, file: &str) -> Response {
        let Some(path) = self.catalog.covers().file_path(file) else {
            return Response::empty_404();
        };

        match std::fs::File::open(&path) {
            Ok(f) => Response::from_file(Self::mime_for_cover(&path), f),
            Err(e) => ApiError::from(StorageError::Fs(e)).into_response(),
        }
    }

    fn mime_for_cover(path: &Path) -> String {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string()
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
