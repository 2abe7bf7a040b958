// File: files.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::OriginState;

/// Static file serving from the document root.
pub async fn handler(
    State(state): State<Arc<OriginState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let request_path = uri.path();
    let Some(relative) = sanitize(request_path) else {
        return StatusCode::FORBIDDEN.into_response();
    };

    let full = match tokio::fs::canonicalize(state.root.join(&relative)).await {
        Ok(full) => full,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };
    // Symlinks may still point outside the root.
    if !full.starts_with(&state.root) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let metadata = match tokio::fs::metadata(&full).await {
        Ok(metadata) => metadata,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    if metadata.is_dir() {
        if !request_path.ends_with('/') {
            let location = format!("{}/", request_path);
            return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
        }
        let index = full.join("index.html");
        if tokio::fs::metadata(&index)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return serve_file(&index).await;
        }
        return match list_directory(&full).await {
            Ok(names) => (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                render_listing(request_path, &names),
            )
                .into_response(),
            Err(e) => {
                debug!("listing {} failed: {}", full.display(), e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        };
    }

    serve_file(&full).await
}

async fn serve_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(contents) => ([(header::CONTENT_TYPE, content_type(path))], contents).into_response(),
        Err(e) => {
            debug!("reading {} failed: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Maps a request path onto a path relative to the root. `None` if any
/// segment tries to climb out of it.
pub fn sanitize(request_path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') => return None,
            s => relative.push(s),
        }
    }
    Some(relative)
}

pub fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("txt") | Some("md") | Some("rs") | Some("rb") | Some("go") => {
            "text/plain; charset=utf-8"
        }
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

async fn list_directory(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

pub fn render_listing(request_path: &str, names: &[String]) -> String {
    let title = escape_html(request_path);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Index of {0}</title></head>\n<body>\n<h1>Index of {0}</h1>\n<ul>\n",
        title
    );
    for name in names {
        let name = escape_html(name);
        html.push_str(&format!("<li><a href=\"{0}\">{0}</a></li>\n", name));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
