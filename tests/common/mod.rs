//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use aspect_dispatch::config::AppConfig;
use aspect_dispatch::dispatch::{Dispatcher, ModelRegistry};
use aspect_dispatch::http::HttpServer;

/// Root of the bundled sample site.
pub fn sample_site() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("site")
}

/// Config serving the sample site, logging errors into `log_dir`.
pub fn sample_config(log_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.paths.application = sample_site().join("application");
    config.paths.public = sample_site().join("public");
    config.paths.log = log_dir.to_path_buf();
    config.site.name = "Test Site".into();
    config
}

/// Site tree written file by file into a temporary directory.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    /// Minimal application root with a layout template and page chrome.
    pub fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture
            .file("application/template/default.template.tera", "<main>{{ pageBody }}</main>")
            .file("application/view/page/default.header.tera", "")
            .file("application/view/page/default.menu.tera", "")
            .file("application/view/page/default.footer.tera", "")
            .file("application/view/page/not-found.page.tera", "not found")
            .file("application/view/page/internal-server-error.page.tera", "error")
            .file("public/critical.css", "")
    }

    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.paths.application = self.path().join("application");
        config.paths.public = self.path().join("public");
        config.paths.log = self.path().join("log");
        config
    }
}

pub fn router(config: &AppConfig, models: ModelRegistry) -> Router {
    let dispatcher = Arc::new(Dispatcher::from_config(config, models));
    HttpServer::build_router(config, dispatcher)
}

/// Send one GET request through the router.
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn content_type(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Lines of every error log file in `dir`.
pub fn error_log_lines(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .flat_map(|entry| {
            std::fs::read_to_string(entry.path())
                .unwrap_or_default()
                .lines()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}
