//! `GET /api/photos?variant=…` over a directory of photos.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::X_FRAME_OPTIONS;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::{Router, middleware};
use photo_carousel::photos::{ListingError, Photo, PhotoListing, Variant};
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Where photos live on disk and how their URLs are spelled.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub root: PathBuf,
    /// URL path the photo directory is published under, e.g. `/static/photos`.
    pub public_prefix: String,
}

#[derive(Clone)]
struct AppState {
    config: Arc<ListingConfig>,
}

#[derive(Debug, Deserialize)]
struct PhotoQuery {
    variant: Option<String>,
}

pub fn router(config: ListingConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/api/photos", get(list_photos))
        .layer(middleware::map_response(deny_foreign_framing))
        .with_state(state)
}

async fn deny_foreign_framing(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    response
}

async fn list_photos(State(state): State<AppState>, Query(query): Query<PhotoQuery>) -> Response {
    let variant = match query.variant.as_deref().map(str::parse::<Variant>) {
        None => Variant::Desktop,
        Some(Ok(variant)) => variant,
        Some(Err(message)) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let config = Arc::clone(&state.config);
    let scanned =
        tokio::task::spawn_blocking(move || scan_photos(&config.root, variant, &config.public_prefix))
            .await;
    match scanned {
        Ok(Ok(photos)) => {
            debug!(%variant, count = photos.len(), "photo listing served");
            Json(PhotoListing {
                photos: Some(photos),
            })
            .into_response()
        }
        Ok(Err(err)) => {
            warn!(%variant, error = %err, "failed to list photos");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "unable to list photos".to_string())
        }
        Err(err) => {
            warn!(%variant, error = %err, "photo listing task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "unable to list photos".to_string())
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ListingError { error })).into_response()
}

/// List the images for `variant`, sorted by file name.
///
/// Uses `<root>/<variant>/` when that directory exists, otherwise `root`
/// itself. Only direct children are listed.
pub fn scan_photos(root: &Path, variant: Variant, public_prefix: &str) -> io::Result<Vec<Photo>> {
    let variant_dir = root.join(variant.as_str());
    let dir = if variant_dir.is_dir() {
        variant_dir
    } else {
        root.to_path_buf()
    };

    let mut relative = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            let rel: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            relative.push(rel.join("/"));
        }
    }
    relative.sort();

    let prefix = public_prefix.trim_end_matches('/');
    Ok(relative
        .into_iter()
        .map(|rel| {
            let url = format!("{prefix}/{rel}");
            Photo {
                view_url: url.clone(),
                url,
            }
        })
        .collect())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|ok| e.eq_ignore_ascii_case(ok)))
        .unwrap_or(false)
}
