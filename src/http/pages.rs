//! HTML pages, filled from the templates in `html/`

use rouille::Response;

use crate::{
    domain::platform::Platform,
    projection::{DashboardRow, TrackCard, TrackPage},
};

const TRACKS_LIST: &str = include_str!("../../html/tracks_list.html");
const TRACK_PAGE: &str = include_str!("../../html/track_page.html");
const NOT_FOUND: &str = include_str!("../../html/not_found.html");
const DASHBOARD: &str = include_str!("../../html/dashboard.html");

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Substitutes `{{NAME}}` markers in a single pass over `template`.
///
/// Inserted values are not scanned again. Unknown markers are left in place.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn tracks_list(artist: &str, cards: &[TrackCard]) -> Response {
    let tiles = cards
        .iter()
        .map(|card| {
            let image = if card.has_cover {
                format!(
                    r#"<img src="{}" alt="{}" loading="lazy">"#,
                    escape(&card.cover_url),
                    escape(&card.title)
                )
            } else {
                r#"<div class="no-cover"></div>"#.to_string()
            };
            format!(
                r#"        <a class="card" href="/{}">{image}<h3>{}</h3><p>{}</p></a>"#,
                escape(&card.id),
                escape(&card.title),
                escape(&card.artist)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Response::html(fill(
        TRACKS_LIST,
        &[("ARTIST", escape(artist)), ("TRACKS", tiles)],
    ))
}

pub fn track_page(page: &TrackPage) -> Response {
    let platforms = page
        .platforms
        .iter()
        .filter(|(_, url)| !url.is_empty())
        .map(|(platform, url)| {
            format!(
                r#"            <li><a class="{platform}" href="{}" target="_blank" rel="noopener">{}</a></li>"#,
                escape(url),
                platform.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Response::html(fill(
        TRACK_PAGE,
        &[
            ("ID", escape(&page.id)),
            ("TITLE", escape(&page.title)),
            ("ARTIST", escape(&page.artist)),
            ("COVER_URL", escape(&page.cover_url)),
            ("TRACK_URL", escape(&page.track_url)),
            ("DESCRIPTION", escape(&page.description)),
            ("PLATFORMS", platforms),
        ],
    ))
}

pub fn not_found(track_id: &str) -> Response {
    Response::html(fill(NOT_FOUND, &[("TRACK_ID", escape(track_id))])).with_status_code(404)
}

pub fn dashboard(rows: &[DashboardRow]) -> Response {
    let rows = rows
        .iter()
        .map(|row| {
            let cover = if row.has_cover {
                format!(r#"<img src="{}" alt="">"#, escape(&row.cover_url))
            } else {
                "no cover".to_string()
            };
            let id = escape(&row.id);
            format!(
                r#"                <tr><td>{cover}</td><td><a href="/{id}">{id}</a></td><td>{}</td><td><input type="checkbox" data-toggle="{id}"{}></td><td><button data-delete="{id}">Delete</button></td></tr>"#,
                escape(&row.title),
                if row.enabled { " checked" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let inputs = Platform::ALL
        .iter()
        .map(|p| format!(r#"            <input name="{p}" placeholder="{}">"#, p.label()))
        .collect::<Vec<_>>()
        .join("\n");

    Response::html(fill(
        DASHBOARD,
        &[("ROWS", rows), ("PLATFORM_INPUTS", inputs)],
    ))
}
