//! Local content serving via custom protocol.
//!
//! A local-path source is loaded as `webpump://localhost/<file>`. Requests on
//! that scheme are answered from the directory containing the entry file, so
//! relative links to scripts, styles and images keep working without a local
//! HTTP server. A standalone build answers them from its embedded assets
//! instead.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{trace, warn};
use wry::http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use wry::http::{Response, StatusCode};

use crate::bundle::EmbeddedAssets;

/// Scheme registered with the webview.
pub const PROTOCOL: &str = "webpump";

#[derive(Debug, Clone)]
enum Backend {
    Directory(PathBuf),
    Embedded(Arc<EmbeddedAssets>),
}

/// Serves files below a root directory, or from an embedded bundle.
#[derive(Debug, Clone)]
pub struct ContentProvider {
    backend: Backend,
}

impl ContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Directory(root.into()),
        }
    }

    pub fn embedded(assets: impl Into<Arc<EmbeddedAssets>>) -> Self {
        Self {
            backend: Backend::Embedded(assets.into()),
        }
    }

    /// Resolve a request path to file bytes and MIME type.
    ///
    /// Returns `None` for missing files and for anything that resolves
    /// outside the root, symlinks included.
    pub fn resolve(&self, path: &str) -> Option<(&'static str, Vec<u8>)> {
        let clean = path.trim_start_matches('/');
        match &self.backend {
            Backend::Directory(root) => read_below(root, clean),
            Backend::Embedded(assets) => {
                let data = assets.get(clean)?;
                Some((mime_from_extension(Path::new(clean)), data))
            }
        }
    }

    /// Answer one custom-protocol request.
    pub fn serve(&self, uri: &str) -> Response<Cow<'static, [u8]>> {
        let path = request_path(uri);
        match self.resolve(&path) {
            Some((mime, data)) => {
                trace!(path = %path, mime, bytes = data.len(), "serving local content");
                respond(StatusCode::OK, mime, Cow::Owned(data))
            }
            None => {
                warn!(path = %path, "custom protocol: content not found");
                respond(
                    StatusCode::NOT_FOUND,
                    "text/plain",
                    Cow::Borrowed(b"Not Found".as_slice()),
                )
            }
        }
    }

    /// Directory being served, or `None` for embedded content.
    pub fn root(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Directory(root) => Some(root),
            Backend::Embedded(_) => None,
        }
    }
}

fn read_below(root: &Path, clean: &str) -> Option<(&'static str, Vec<u8>)> {
    let canonical_root = std::fs::canonicalize(root).ok()?;
    let canonical_file = std::fs::canonicalize(root.join(clean)).ok()?;
    if !canonical_file.starts_with(&canonical_root) || !canonical_file.is_file() {
        return None;
    }

    let data = std::fs::read(&canonical_file).ok()?;
    Some((mime_from_extension(&canonical_file), data))
}

/// URL the webview should open for an entry file below the provider root.
pub fn protocol_url(entry: &str) -> String {
    format!("{PROTOCOL}://localhost/{}", urlencoding::encode(entry))
}

/// Extract the decoded file path from a custom-protocol request URI.
///
/// WebView2 rewrites `webpump://localhost/...` to
/// `http://webpump.localhost/...`, so both forms are accepted.
pub fn request_path(uri: &str) -> String {
    let rest = [
        "webpump://localhost/",
        "webpump://localhost",
        "http://webpump.localhost/",
        "https://webpump.localhost/",
        "webpump:///",
        "webpump://",
    ]
    .iter()
    .find_map(|prefix| uri.strip_prefix(prefix))
    .unwrap_or("");

    let rest = rest.split(['?', '#']).next().unwrap_or("");
    urlencoding::decode(rest)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| rest.to_string())
}

fn respond(
    status: StatusCode,
    mime: &'static str,
    body: Cow<'static, [u8]>,
) -> Response<Cow<'static, [u8]>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime));
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("webpump://localhost"),
    );
    response
}

/// Guess MIME type from file extension.
fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html>hello</html>").unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/app.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("my page.html"), "<p>spaced</p>").unwrap();
        dir
    }

    #[test]
    fn resolves_files_below_root() {
        let dir = site();
        let cp = ContentProvider::new(dir.path());

        let (mime, data) = cp.resolve("index.html").unwrap();
        assert_eq!(mime, "text/html");
        assert_eq!(data, b"<html>hello</html>");

        let (mime, _) = cp.resolve("/js/app.js").unwrap();
        assert_eq!(mime, "application/javascript");
    }

    #[test]
    fn missing_file_is_none() {
        let dir = site();
        let cp = ContentProvider::new(dir.path());
        assert!(cp.resolve("nope.html").is_none());
    }

    #[test]
    fn directory_is_not_served() {
        let dir = site();
        let cp = ContentProvider::new(dir.path());
        assert!(cp.resolve("js").is_none());
    }

    #[test]
    fn traversal_is_blocked() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        fs::create_dir(outer.path().join("site")).unwrap();
        fs::write(outer.path().join("site/index.html"), "ok").unwrap();

        let cp = ContentProvider::new(outer.path().join("site"));
        assert!(cp.resolve("index.html").is_some());
        assert!(cp.resolve("../secret.txt").is_none());
        assert!(cp.resolve("js/../../secret.txt").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_is_blocked() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        fs::create_dir(outer.path().join("site")).unwrap();
        std::os::unix::fs::symlink(
            outer.path().join("secret.txt"),
            outer.path().join("site/link.txt"),
        )
        .unwrap();

        let cp = ContentProvider::new(outer.path().join("site"));
        assert!(cp.resolve("link.txt").is_none());
    }

    #[test]
    fn request_path_strips_scheme_variants() {
        assert_eq!(request_path("webpump://localhost/index.html"), "index.html");
        assert_eq!(request_path("webpump://localhost/js/app.js"), "js/app.js");
        assert_eq!(request_path("http://webpump.localhost/index.html"), "index.html");
        assert_eq!(request_path("webpump://localhost"), "");
        assert_eq!(request_path("https://example.com/index.html"), "");
    }

    #[test]
    fn request_path_drops_query_and_decodes() {
        assert_eq!(request_path("webpump://localhost/app.js?v=3"), "app.js");
        assert_eq!(request_path("webpump://localhost/index.html#top"), "index.html");
        assert_eq!(request_path("webpump://localhost/my%20page.html"), "my page.html");
    }

    #[test]
    fn protocol_url_round_trips_through_request_path() {
        let url = protocol_url("my page.html");
        assert_eq!(url, "webpump://localhost/my%20page.html");
        assert_eq!(request_path(&url), "my page.html");
    }

    #[test]
    fn serve_answers_with_status_and_mime() {
        let dir = site();
        let cp = ContentProvider::new(dir.path());

        let ok = cp.serve("webpump://localhost/my%20page.html");
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()["Content-Type"], "text/html");
        assert_eq!(ok.body().as_ref(), b"<p>spaced</p>");

        assert_eq!(ok.headers()["Access-Control-Allow-Origin"], "webpump://localhost");

        let missing = cp.serve("webpump://localhost/missing.css");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.headers()["Content-Type"], "text/plain");
        assert_eq!(missing.body().as_ref(), b"Not Found");
    }

    #[test]
    fn embedded_assets_are_served() {
        let dir = site();
        let cp = ContentProvider::embedded(EmbeddedAssets::from_dir(dir.path()).unwrap());
        assert!(cp.root().is_none());

        let ok = cp.serve("webpump://localhost/js/app.js?v=2");
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()["Content-Type"], "application/javascript");
        assert_eq!(ok.body().as_ref(), b"console.log(1)");

        let (mime, data) = cp.resolve("my page.html").unwrap();
        assert_eq!(mime, "text/html");
        assert_eq!(data, b"<p>spaced</p>");

        assert_eq!(cp.serve("webpump://localhost/js").status(), StatusCode::NOT_FOUND);
        assert!(cp.resolve("js/../index.html").is_none());
    }

    #[test]
    fn mime_types() {
        assert_eq!(mime_from_extension(Path::new("a.htm")), "text/html");
        assert_eq!(mime_from_extension(Path::new("a.css")), "text/css");
        assert_eq!(mime_from_extension(Path::new("a.mjs")), "application/javascript");
        assert_eq!(mime_from_extension(Path::new("a.xyz")), "application/octet-stream");
        assert_eq!(mime_from_extension(Path::new("Makefile")), "application/octet-stream");
    }
}
