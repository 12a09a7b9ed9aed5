//! Static file serving module
//!
//! Resolves non-API paths against the asset store with single-page-app
//! fallback, and renders the diagnostic page used when the store is down.

use chrono::{SecondsFormat, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::{AppState, AssetsConfig};
use crate::handler::assets::{self, Asset, AssetError};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, CachePolicy};

/// Map a request path to its asset key; directories resolve to their index file
fn asset_key(path: &str, index_file: &str) -> String {
    if path.ends_with('/') {
        format!("{path}{index_file}")
    } else {
        path.to_string()
    }
}

/// Client-side routes have no extension in their last segment
pub fn looks_like_file(path: &str) -> bool {
    assets::extension(path).is_some()
}

/// Serve the asset for `ctx.path`, falling back to the SPA entry document.
///
/// Returns `Err` only when the store (or the entry document) is unavailable;
/// the caller degrades to [`status_page`].
pub async fn serve(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, AssetError> {
    let cfg = &state.config.assets;
    let entry_key = format!("/{}", cfg.index_file);
    let key = asset_key(ctx.path, &cfg.index_file);

    if let Some(asset) = state.assets.get(&key).await? {
        let policy = if key == entry_key {
            CachePolicy::NoCache
        } else {
            public_policy(cfg)
        };
        return Ok(respond(ctx, &asset, policy));
    }

    // Judge the requested path, not the key: `/about/` maps to an index key
    if looks_like_file(ctx.path) && key != entry_key {
        return Ok(http::build_404_response());
    }

    match state.assets.get(&entry_key).await? {
        Some(entry) => Ok(respond(ctx, &entry, CachePolicy::NoCache)),
        None => Err(AssetError::Unavailable(format!(
            "entry document {entry_key} is missing"
        ))),
    }
}

const fn public_policy(cfg: &AssetsConfig) -> CachePolicy {
    CachePolicy::Public {
        browser: cfg.browser_ttl,
        edge: cfg.edge_ttl,
    }
}

fn respond(ctx: &RequestContext<'_>, asset: &Asset, policy: CachePolicy) -> Response<Full<Bytes>> {
    let cache_control = policy.to_header_value();

    if cache::check_etag_match(ctx.if_none_match, &asset.etag) {
        return http::build_304_response(&asset.etag, &cache_control);
    }

    http::build_asset_response(
        asset.body.clone(),
        asset.content_type,
        &asset.etag,
        &cache_control,
        ctx.is_head,
    )
}

/// Minimal page shown when the bundle cannot be served.
///
/// Always 200 so visitors never see a raw error; the path and time help
/// correlate with the error log.
pub fn status_page(path: &str, is_head: bool) -> Response<Full<Bytes>> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Portfolio</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
            margin: 0;
            padding: 40px;
            background: #f5f5f5;
            text-align: center;
        }}
        .status {{
            background: white;
            padding: 40px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1);
            max-width: 480px;
            margin: 0 auto;
        }}
        code {{ color: #555; }}
    </style>
</head>
<body>
    <div class="status">
        <h1>Service running</h1>
        <p>The site is up but its assets are currently unavailable. Please try again shortly.</p>
        <p><small>Requested: <code>{path}</code><br>Time: <code>{timestamp}</code></small></p>
    </div>
</body>
</html>"#,
        path = http::escape_html(path),
    );

    http::build_html_response(html, is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::contact::notifier::NoopNotifier;
    use crate::handler::assets::testing::MemoryAssetStore;
    use hyper::{Method, StatusCode};
    use std::sync::Arc;

    const PUBLIC: &str = "public, max-age=86400, s-maxage=604800";

    fn state(store: MemoryAssetStore) -> AppState {
        let config = Config::load_from("does-not-exist/portfolio").unwrap();
        AppState::new(config, Arc::new(store), Arc::new(NoopNotifier))
    }

    fn bundle() -> MemoryAssetStore {
        MemoryAssetStore::default()
            .with("/index.html", "<html>spa</html>")
            .with("/app.js", "console.log(1)")
            .with("/blog/index.html", "<html>blog</html>")
    }

    async fn get(state: &AppState, path: &str) -> Result<Response<Full<Bytes>>, AssetError> {
        let ctx = RequestContext {
            method: &Method::GET,
            path,
            is_head: false,
            if_none_match: None,
            body: &[],
        };
        serve(&ctx, state).await
    }

    async fn text(resp: Response<Full<Bytes>>) -> String {
        use http_body_util::BodyExt;
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_asset_key() {
        assert_eq!(asset_key("/", "index.html"), "/index.html");
        assert_eq!(asset_key("/blog/", "index.html"), "/blog/index.html");
        assert_eq!(asset_key("/app.js", "index.html"), "/app.js");
    }

    #[test]
    fn test_looks_like_file() {
        assert!(looks_like_file("/app.js"));
        assert!(looks_like_file("/a/b/style.min.css"));
        assert!(!looks_like_file("/about"));
        assert!(!looks_like_file("/about/"));
        assert!(!looks_like_file("/v1.2/"));
        assert!(!looks_like_file("/.well-known"));
    }

    #[tokio::test]
    async fn test_entry_document_is_not_cached() {
        let state = state(bundle());
        for path in ["/", "/index.html"] {
            let resp = get(&state, path).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["Cache-Control"], "no-cache", "{path}");
            assert_eq!(text(resp).await, "<html>spa</html>");
        }
    }

    #[tokio::test]
    async fn test_bundle_files_are_public() {
        let state = state(bundle());
        for (path, body) in [("/app.js", "console.log(1)"), ("/blog/", "<html>blog</html>")] {
            let resp = get(&state, path).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["Cache-Control"], PUBLIC, "{path}");
            assert_eq!(text(resp).await, body);
        }
    }

    #[tokio::test]
    async fn test_client_routes_get_entry_document() {
        let state = state(bundle());
        for path in ["/about", "/about/", "/projects/x/", "/projects/x"] {
            let resp = get(&state, path).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["Cache-Control"], "no-cache", "{path}");
            assert_eq!(text(resp).await, "<html>spa</html>", "{path}");
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let state = state(bundle());
        for path in ["/missing.js", "/assets/logo.png"] {
            let resp = get(&state, path).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_missing_entry_document_is_an_error() {
        let state = state(MemoryAssetStore::default().with("/app.js", "x"));
        for path in ["/", "/index.html", "/about/"] {
            assert!(
                matches!(get(&state, path).await, Err(AssetError::Unavailable(_))),
                "{path}"
            );
        }
        assert_eq!(get(&state, "/app.js").await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_page_escapes_path() {
        let resp = status_page("/<script>alert(1)</script>", false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Cache-Control"], "no-store");
        let html = text(resp).await;
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn test_status_page_head_has_no_body() {
        let resp = status_page("/", true);
        assert_ne!(resp.headers()["Content-Length"], "0");
        assert!(text(resp).await.is_empty());
    }
}
