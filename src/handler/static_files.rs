//! Static file serving module
//!
//! Maps resolver outcomes to HTTP responses: file reads, MIME detection,
//! conditional requests, and cache headers.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use crate::routing::{self, ResolveError, Resolved};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Cache policy for bundle assets (hashed filenames make these stable)
const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";
/// The SPA shell must revalidate so a new deploy is picked up
const INDEX_CACHE_CONTROL: &str = "no-cache";

/// Serve a request path from the document root with SPA fallback
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let resolved = routing::resolve(ctx.path, &state.document_root, &state.config.spa.index_file);

    match resolved {
        Ok(Resolved::File(path)) => {
            let cache_control = if is_index_file(&path, &state.config.spa.index_file) {
                INDEX_CACHE_CONTROL
            } else {
                ASSET_CACHE_CONTROL
            };
            serve_file(ctx, &path, cache_control).await
        }
        Ok(Resolved::SpaFallback(path)) => serve_file(ctx, &path, INDEX_CACHE_CONTROL).await,
        Ok(Resolved::NotFound(_)) => http::build_404_response(),
        Err(ResolveError::Decode(raw)) => {
            logger::log_warning(&format!("Undecodable request path: {raw}"));
            http::build_400_response()
        }
        Err(ResolveError::Traversal(raw)) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {raw}"));
            http::build_404_response()
        }
    }
}

/// Read a resolved file and build the 200/304 response
async fn serve_file(
    ctx: &RequestContext<'_>,
    path: &Path,
    cache_control: &str,
) -> Response<Full<Bytes>> {
    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            // Resolved a moment ago; losing the race to a redeploy is a miss.
            logger::log_error(&format!("Failed to read '{}': {e}", path.display()));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
    http::response::build_file_response(
        Bytes::from(content),
        content_type,
        &etag,
        cache_control,
        ctx.is_head,
    )
}

/// Directory-index hits serve the shell too and share its cache policy
fn is_index_file(path: &Path, index_file: &str) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(index_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn make_state(root: &TempDir) -> AppState {
        let mut config = Config::load_from("nonexistent-test-config").unwrap();
        config.spa.document_root = root.path().to_str().unwrap().to_string();
        AppState::new(config).unwrap()
    }

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            if_none_match: None,
        }
    }

    #[tokio::test]
    async fn test_asset_hit_gets_public_caching() {
        let root = TempDir::new().unwrap();
        std_fs::write(root.path().join("app.js"), "console.log(1)").unwrap();
        let state = make_state(&root);

        let resp = serve(&ctx("/app.js"), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("Cache-Control")
                .and_then(|v| v.to_str().ok()),
            Some(ASSET_CACHE_CONTROL)
        );
        assert_eq!(
            resp.headers()
                .get("Content-Type")
                .and_then(|v| v.to_str().ok()),
            Some("application/javascript")
        );
    }

    #[tokio::test]
    async fn test_fallback_serves_shell_with_no_cache() {
        let root = TempDir::new().unwrap();
        std_fs::write(root.path().join("index.html"), "<html></html>").unwrap();
        let state = make_state(&root);

        let resp = serve(&ctx("/dashboard/settings"), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("Cache-Control")
                .and_then(|v| v.to_str().ok()),
            Some(INDEX_CACHE_CONTROL)
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_404() {
        let root = TempDir::new().unwrap();
        std_fs::write(root.path().join("index.html"), "<html></html>").unwrap();
        let state = make_state(&root);

        let resp = serve(&ctx("/missing.png"), &state).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_traversal_is_404_not_fallback() {
        let root = TempDir::new().unwrap();
        std_fs::write(root.path().join("index.html"), "<html></html>").unwrap();
        let state = make_state(&root);

        let resp = serve(&ctx("/../../etc/passwd"), &state).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_undecodable_path_is_400() {
        let root = TempDir::new().unwrap();
        let state = make_state(&root);

        let resp = serve(&ctx("/%ff"), &state).await;
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_etag_match_returns_304() {
        let root = TempDir::new().unwrap();
        std_fs::write(root.path().join("app.js"), "console.log(1)").unwrap();
        let state = make_state(&root);

        let first = serve(&ctx("/app.js"), &state).await;
        let etag = first
            .headers()
            .get("ETag")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();

        let conditional = RequestContext {
            path: "/app.js",
            is_head: false,
            if_none_match: Some(etag),
        };
        let second = serve(&conditional, &state).await;
        assert_eq!(second.status(), 304);
    }
}
