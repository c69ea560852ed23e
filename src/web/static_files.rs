use axum::{
    body::Body,
    http::{header, Response},
};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::config::AssetConfig;
use crate::error::{AppError, Result};

/// Placeholder replaced with the signaling URL when rendering the template
pub const SIGNALING_URL_PLACEHOLDER: &str = "{{SIGNALING_URL}}";

/// Serve a request path (without the leading `/`).
///
/// `""` and `index.html` are the entry document: the rendered template when
/// one is configured, the static index otherwise.
pub async fn serve_path(
    assets: &AssetConfig,
    signaling_url: &str,
    path: &str,
) -> Result<Response<Body>> {
    let is_entry = path.is_empty() || path == "index.html";
    match (&assets.template, is_entry) {
        (Some(template), true) => serve_template(&assets.public_dir, template, signaling_url).await,
        (None, true) => serve_file(&assets.public_dir, &assets.index).await,
        (_, false) => serve_file(&assets.public_dir, path).await,
    }
}

/// Read the entry template and substitute the signaling URL
async fn serve_template(root: &Path, template: &str, signaling_url: &str) -> Result<Response<Body>> {
    let path = resolve_asset_path(root, template)
        .ok_or_else(|| AppError::TemplateUnavailable(template.to_string()))?;

    let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
        AppError::TemplateUnavailable(format!("{}: {}", path.display(), e))
    })?;
    let rendered = render_template(&raw, signaling_url)?;

    Ok(ok_response("text/html", rendered.into_bytes()))
}

/// Replace the first placeholder with the URL as a JS string literal
pub fn render_template(template: &str, signaling_url: &str) -> Result<String> {
    let literal = serde_json::to_string(signaling_url)?;
    Ok(template.replacen(SIGNALING_URL_PLACEHOLDER, &literal, 1))
}

async fn serve_file(root: &Path, path: &str) -> Result<Response<Body>> {
    let file_path = resolve_asset_path(root, path).ok_or_else(|| {
        tracing::warn!("Rejected asset path: {}", path);
        AppError::NotFound(path.to_string())
    })?;

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(path.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(AppError::NotFound(path.to_string()));
    }

    let data = match tokio::fs::read(&file_path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(path.to_string()))
        }
        Err(e) => {
            tracing::debug!(
                "Failed to read static file '{}' from '{}': {}",
                path,
                file_path.display(),
                e
            );
            return Err(e.into());
        }
    };

    Ok(ok_response(&content_type_for(path), data))
}

/// Map a request path onto the public root.
///
/// Only plain relative components are accepted, so the result can never
/// escape `root`.
pub fn resolve_asset_path(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path);
    if path.is_empty() || path.contains('\0') {
        return None;
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

/// Content type by file extension
pub fn content_type_for(path: &str) -> String {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html") => "text/html".to_string(),
        Some("js") => "application/javascript".to_string(),
        Some("css") => "text/css".to_string(),
        _ => mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("text/plain")
            .to_string(),
    }
}

fn ok_response(content_type: &str, data: Vec<u8>) -> Response<Body> {
    let mut response = Response::new(Body::from(data));
    if let Ok(value) = content_type.parse() {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tempfile::TempDir;

    fn fixture(template: bool) -> (TempDir, AssetConfig) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>static index</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "plain").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        if template {
            std::fs::write(
                dir.path().join("template.html"),
                "<script>const url = {{SIGNALING_URL}};</script>",
            )
            .unwrap();
        }
        let config = AssetConfig {
            public_dir: dir.path().to_path_buf(),
            index: "index.html".to_string(),
            template: template.then(|| "template.html".to_string()),
        };
        (dir, config)
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("js/app.js"), "application/javascript");
        assert_eq!(content_type_for("style.CSS"), "text/css");
        assert_eq!(content_type_for("favicon.png"), "image/png");
        assert_eq!(content_type_for("LICENSE"), "text/plain");
    }

    #[test]
    fn test_render_template_quotes_url() {
        let rendered =
            render_template("a={{SIGNALING_URL}}; b={{SIGNALING_URL}}", "ws://h:1").unwrap();
        assert_eq!(rendered, r#"a="ws://h:1"; b={{SIGNALING_URL}}"#);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/public");
        assert_eq!(
            resolve_asset_path(root, "js/app.js"),
            Some(PathBuf::from("/srv/public/js/app.js"))
        );
        assert!(resolve_asset_path(root, "../secret").is_none());
        assert!(resolve_asset_path(root, "js/../../secret").is_none());
        assert!(resolve_asset_path(root, "/etc/passwd").is_none());
        assert!(resolve_asset_path(root, "").is_none());
    }

    #[tokio::test]
    async fn test_root_renders_template() {
        let (_dir, config) = fixture(true);
        let response = serve_path(&config, "ws://example.com:3000", "").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
        assert_eq!(
            body_string(response).await,
            r#"<script>const url = "ws://example.com:3000";</script>"#
        );
    }

    #[tokio::test]
    async fn test_index_html_renders_template() {
        let (_dir, config) = fixture(true);
        let response = serve_path(&config, "ws://x", "index.html").await.unwrap();
        assert!(body_string(response).await.contains(r#""ws://x""#));
    }

    #[tokio::test]
    async fn test_missing_template_is_500() {
        let (dir, config) = fixture(true);
        std::fs::remove_file(dir.path().join("template.html")).unwrap();

        let err = serve_path(&config, "ws://x", "").await.unwrap_err();
        assert!(matches!(err, AppError::TemplateUnavailable(_)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Error loading template");
    }

    #[tokio::test]
    async fn test_root_without_template_serves_index() {
        let (_dir, config) = fixture(false);
        let response = serve_path(&config, "ws://x", "").await.unwrap();
        assert_eq!(body_string(response).await, "<h1>static index</h1>");
    }

    #[tokio::test]
    async fn test_static_file_served_with_type() {
        let (_dir, config) = fixture(true);
        let response = serve_path(&config, "ws://x", "app.js").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/javascript"
        );
        assert_eq!(response.headers().len(), 1);
        assert_eq!(body_string(response).await, "console.log('hi');");

        let response = serve_path(&config, "ws://x", "notes.txt").await.unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let (_dir, config) = fixture(true);
        let err = serve_path(&config, "ws://x", "nope.js").await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "File not found");
    }

    #[tokio::test]
    async fn test_directory_and_traversal_are_404() {
        let (_dir, config) = fixture(true);
        assert!(matches!(
            serve_path(&config, "ws://x", "sub").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            serve_path(&config, "ws://x", "../Cargo.toml").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
