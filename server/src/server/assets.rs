//! Embedded browser page (`web/`).

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "../web/"]
struct WebAssets;

pub async fn index() -> Response {
    serve_embedded("index.html")
}

/// Unmatched paths: JSON 404 under `/api` and `/ws`, the page otherwise.
pub async fn fallback(uri: Uri) -> Response {
    let request_path = uri.path();
    if is_api_path(request_path) {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "Not Found",
                "path": request_path,
            })),
        )
            .into_response();
    }

    serve_embedded(request_path.trim_start_matches('/'))
}

fn is_api_path(path: &str) -> bool {
    ["/api", "/ws"].iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn serve_embedded(path: &str) -> Response {
    let (path, asset) = match WebAssets::get(path) {
        Some(asset) => (path, asset),
        None => match WebAssets::get("index.html") {
            Some(asset) => ("index.html", asset),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref())],
        asset.data.to_vec(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn api_paths_are_matched_by_root_segment() {
        for path in ["/api", "/api/nope", "/ws", "/ws/extra"] {
            assert!(is_api_path(path), "{path} should be an API path");
        }
        for path in ["/", "/apiary", "/wsx", "/style.css"] {
            assert!(!is_api_path(path), "{path} should not be an API path");
        }
    }

    #[tokio::test]
    async fn unknown_api_path_gets_json_404() {
        let response = fallback(Uri::from_static("/api/nonexistent")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/api/nonexistent");
    }

    #[tokio::test]
    async fn page_assets_are_served_with_mime_type() {
        let response = index().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );

        let response = fallback(Uri::from_static("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let mime = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(mime.contains("javascript"), "{mime}");
    }
}
