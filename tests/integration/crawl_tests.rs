//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! mirror cycle end-to-end, plus in-memory collaborators where the test needs
//! to observe concurrency or avoid the filesystem.

use async_trait::async_trait;
use site_mirror::config::Config;
use site_mirror::crawler::{
    Coordinator, FetchError, FetchedResponse, HookError, Resource, ResourceHooks, Transport,
};
use site_mirror::storage::{FsStore, StorageError, StorageResult, Store};
use site_mirror::ResourceKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for `host` writing below `root`
fn create_test_config(host: &str, root: &Path, max_connections: u32) -> Config {
    let mut config = Config::for_host(host);
    config.output.root = root.display().to_string();
    config.crawler.max_connections = max_connections;
    config.crawler.tick_interval_ms = 5; // Very short for testing
    config.crawler.idle_ticks = 4;
    config
}

fn host_of(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

async fn mount(server: &MockServer, route: &str, body: &str, content_type: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), content_type))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_mirror_single_site() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        r#"<html>
        <head>
            <link rel="stylesheet" href="/css/site.css">
            <script src="js/app.js"></script>
        </head>
        <body>
            <a href="https://elsewhere.org/page">Elsewhere</a>
        </body>
        </html>"#,
        "text/html; charset=utf-8",
        1,
    )
    .await;
    mount(
        &mock_server,
        "/css/site.css",
        "body { background-image: url(/img/bg.png); }",
        "text/css",
        1,
    )
    .await;
    mount(&mock_server, "/js/app.js", "console.log(1);", "application/javascript", 1).await;
    mount(&mock_server, "/img/bg.png", "PNG", "image/png", 1).await;

    let host = host_of(&mock_server);
    let config = create_test_config(&host, output.path(), 2);
    let mut coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.run().await;

    assert_eq!(stats.html, 1);
    assert_eq!(stats.css, 1);
    assert_eq!(stats.image, 1);
    assert_eq!(stats.js, 1);
    assert_eq!(stats.other, 0);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.total, 4);

    let visited = coordinator.visited_urls();
    assert_eq!(visited.len(), 4);
    assert!(visited.iter().all(|url| !url.contains("elsewhere.org")));

    assert!(output.path().join("index.html").is_file());
    assert!(output.path().join("css/site.css").is_file());
    assert!(output.path().join("js/app.js").is_file());
    assert_eq!(
        std::fs::read_to_string(output.path().join("img/bg.png")).unwrap(),
        "PNG"
    );
}

#[tokio::test]
async fn test_failed_fetch_is_counted() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        r#"<a href="/about">About</a><img src="/missing.png">"#,
        "text/html",
        1,
    )
    .await;
    mount(&mock_server, "/about", "<p>About us</p>", "text/html", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&host_of(&mock_server), output.path(), 1);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.html, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.total, 2);
    assert!(output.path().join("about/index.html").is_file());
    assert!(!output.path().join("missing.png").exists());
}

#[tokio::test]
async fn test_duplicate_references_fetched_once() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let page = r#"
        <a href="/">Home</a>
        <a href="/a">A</a>
        <a href="./a">A again</a>
        <a href="/b">B</a>
    "#;
    mount(&mock_server, "/", page, "text/html", 1).await;
    mount(&mock_server, "/a", page, "text/html", 1).await;
    mount(&mock_server, "/b", page, "text/html", 1).await;

    let config = create_test_config(&host_of(&mock_server), output.path(), 3);
    let mut coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.run().await;

    assert_eq!(stats.html, 3);
    assert_eq!(stats.total, 3);
    assert_eq!(coordinator.visited_urls().len(), 3);
    // Mock expectations are verified when the server drops
}

#[tokio::test]
async fn test_link_kinds_follow_content_type() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        r#"<a href="/styles">S</a><a href="/logo">L</a><a href="/report.pdf">R</a>"#,
        "text/html",
        1,
    )
    .await;
    mount(&mock_server, "/styles", "p { color: red }", "text/css", 1).await;
    mount(&mock_server, "/logo", "GIF89a", "image/gif", 1).await;
    mount(&mock_server, "/report.pdf", "%PDF", "application/pdf", 1).await;

    let config = create_test_config(&host_of(&mock_server), output.path(), 2);
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.html, 1);
    assert_eq!(stats.css, 1);
    assert_eq!(stats.image, 1);
    assert_eq!(stats.other, 1);
    assert!(output.path().join("report.pdf").is_file());
}

#[tokio::test]
async fn test_disabled_downloads_are_not_followed() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        r#"<script src="/app.js"></script><img src="/pic.png"><link href="/s.css">"#,
        "text/html",
        1,
    )
    .await;
    mount(&mock_server, "/s.css", "", "text/css", 1).await;
    mount(&mock_server, "/app.js", "", "application/javascript", 0).await;
    mount(&mock_server, "/pic.png", "", "image/png", 0).await;

    let mut config = create_test_config(&host_of(&mock_server), output.path(), 1);
    config.download.javascript = false;
    config.download.images = false;
    let stats = Coordinator::new(config).unwrap().run().await;

    assert_eq!(stats.total, 2);
    assert_eq!(stats.js, 0);
    assert_eq!(stats.image, 0);
}

/// Serves a fixed set of URLs from memory and records fetch concurrency
struct StaticSite {
    routes: HashMap<String, (&'static str, String)>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fetches: AtomicUsize,
}

impl StaticSite {
    fn new(delay: Duration) -> Self {
        Self {
            routes: HashMap::new(),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    fn route(mut self, url: &str, content_type: &'static str, body: impl Into<String>) -> Self {
        self.routes
            .insert(url.to_string(), (content_type, body.into()));
        self
    }
}

#[async_trait]
impl Transport for StaticSite {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.routes.get(url) {
            Some((content_type, body)) => Ok(FetchedResponse {
                final_url: url.to_string(),
                status_code: 200,
                content_type: Some(content_type.to_string()),
                body: body.clone().into_bytes(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status_code: 404,
            }),
        }
    }
}

/// Keeps saved bodies in memory
#[derive(Default)]
struct MemoryStore {
    saved: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn save(&self, relative_path: &Path, body: &[u8]) -> StorageResult<()> {
        self.saved
            .lock()
            .unwrap()
            .insert(relative_path.to_path_buf(), body.to_vec());
        Ok(())
    }
}

fn wide_site(delay: Duration) -> StaticSite {
    let links: String = (0..12)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    let mut site = StaticSite::new(delay).route("http://example.com/", "text/html", links);
    for i in 0..12 {
        site = site.route(
            &format!("http://example.com/p{}", i),
            "text/plain",
            format!("page {}", i),
        );
    }
    site
}

#[tokio::test]
async fn test_connection_cap_is_respected() {
    let output = TempDir::new().unwrap();
    let site = Arc::new(wide_site(Duration::from_millis(20)));
    let store = Arc::new(MemoryStore::default());

    let config = create_test_config("example.com", output.path(), 3);
    let mut coordinator = Coordinator::with_collaborators(config, site.clone(), store.clone());
    let stats = coordinator.run().await;

    assert_eq!(stats.total, 13);
    assert_eq!(stats.other, 12);
    assert_eq!(site.fetches.load(Ordering::SeqCst), 13);
    let peak = site.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {} exceeded the cap", peak);
    assert!(peak >= 2, "fetches never overlapped");
    assert_eq!(store.saved.lock().unwrap().len(), 13);
}

#[tokio::test]
async fn test_single_connection_is_sequential() {
    let output = TempDir::new().unwrap();
    let site = Arc::new(wide_site(Duration::from_millis(2)));
    let store = Arc::new(MemoryStore::default());

    let config = create_test_config("example.com", output.path(), 1);
    let stats = Coordinator::with_collaborators(config, site.clone(), store)
        .run()
        .await;

    assert_eq!(stats.total, 13);
    assert_eq!(site.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_max_pages_limits_dispatch() {
    let output = TempDir::new().unwrap();
    let site = Arc::new(wide_site(Duration::from_millis(1)));

    let mut config = create_test_config("example.com", output.path(), 2);
    config.crawler.max_pages = Some(5);
    let store = Arc::new(MemoryStore::default());
    let stats = Coordinator::with_collaborators(config, site.clone(), store)
        .run()
        .await;

    assert_eq!(stats.total, 5);
    assert_eq!(site.fetches.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_unreachable_seed_still_finishes() {
    let output = TempDir::new().unwrap();
    let site = Arc::new(StaticSite::new(Duration::from_millis(1)));

    let config = create_test_config("example.com", output.path(), 4);
    let stats = Coordinator::with_collaborators(config, site, Arc::new(MemoryStore::default()))
        .run()
        .await;

    assert_eq!(stats.total, 0);
    assert_eq!(stats.failed, 1);
}

/// Refuses writes to one path and keeps everything else in memory
struct ReadOnlyPath {
    refused: PathBuf,
    inner: MemoryStore,
}

#[async_trait]
impl Store for ReadOnlyPath {
    async fn save(&self, relative_path: &Path, body: &[u8]) -> StorageResult<()> {
        if relative_path == self.refused {
            return Err(StorageError::Write {
                path: relative_path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.save(relative_path, body).await
    }
}

#[tokio::test]
async fn test_save_failure_is_counted_and_crawl_finishes() {
    let output = TempDir::new().unwrap();
    let site = Arc::new(
        StaticSite::new(Duration::from_millis(1))
            .route(
                "http://example.com/",
                "text/html",
                r#"<link href="/locked.css"><a href="/next">n</a>"#,
            )
            .route(
                "http://example.com/locked.css",
                "text/css",
                "p { background: url(/never.png) }",
            )
            .route("http://example.com/next", "text/html", "<p>done</p>")
            .route("http://example.com/never.png", "image/png", "PNG"),
    );
    let store = Arc::new(ReadOnlyPath {
        refused: PathBuf::from("locked.css"),
        inner: MemoryStore::default(),
    });

    let config = create_test_config("example.com", output.path(), 2);
    let mut coordinator = Coordinator::with_collaborators(config, site.clone(), store.clone());
    let stats = coordinator.run().await;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.html, 2);
    assert_eq!(stats.css, 0);
    assert_eq!(stats.total, 2);
    // The stylesheet was never saved, so it was never parsed either
    assert!(!coordinator
        .visited_urls()
        .contains(&"http://example.com/never.png".to_string()));
    assert_eq!(site.fetches.load(Ordering::SeqCst), 3);
    assert_eq!(store.inner.saved.lock().unwrap().len(), 2);
}

/// Vetoes images and records every saved URL
#[derive(Default)]
struct NoImages {
    saved: Mutex<Vec<(String, ResourceKind)>>,
}

impl ResourceHooks for NoImages {
    fn pre_process(&self, resource: &Resource) -> Result<(), HookError> {
        if resource.kind == ResourceKind::Image {
            return Err(HookError::new(&resource.url, "images not wanted"));
        }
        Ok(())
    }

    fn post_process(&self, resource: &Resource) {
        self.saved
            .lock()
            .unwrap()
            .push((resource.url.clone(), resource.kind));
    }
}

#[tokio::test]
async fn test_pre_process_veto_counts_as_failure() {
    let output = TempDir::new().unwrap();
    let site = Arc::new(
        StaticSite::new(Duration::from_millis(1))
            .route(
                "http://example.com/",
                "text/html",
                r#"<img src="/a.png"><link href="/s.css">"#,
            )
            .route("http://example.com/a.png", "image/png", "PNG")
            .route("http://example.com/s.css", "text/css", "p {}"),
    );
    let hooks = Arc::new(NoImages::default());
    let store = FsStore::new(output.path());

    let config = create_test_config("example.com", output.path(), 1);
    let stats = Coordinator::with_collaborators(config, site, Arc::new(store))
        .with_hooks(hooks.clone())
        .run()
        .await;

    assert_eq!(stats.html, 1);
    assert_eq!(stats.css, 1);
    assert_eq!(stats.image, 0);
    assert_eq!(stats.failed, 1);
    assert!(!output.path().join("a.png").exists());
    assert!(output.path().join("s.css").is_file());

    let saved = hooks.saved.lock().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0], ("http://example.com/".to_string(), ResourceKind::Page));
}

/// Records the final URL every saved resource was served from
#[derive(Default)]
struct FinalUrls(Mutex<Vec<(String, String)>>);

impl ResourceHooks for FinalUrls {
    fn post_process(&self, resource: &Resource) {
        self.0
            .lock()
            .unwrap()
            .push((resource.url.clone(), resource.final_url.clone()));
    }
}

#[tokio::test]
async fn test_redirect_target_reaches_hooks() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount(&mock_server, "/", r#"<a href="/old">Old</a>"#, "text/html", 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount(&mock_server, "/new", "<p>moved</p>", "text/html", 1).await;

    let host = host_of(&mock_server);
    let hooks = Arc::new(FinalUrls::default());
    let config = create_test_config(&host, output.path(), 1);
    let stats = Coordinator::new(config)
        .unwrap()
        .with_hooks(hooks.clone())
        .run()
        .await;

    assert_eq!(stats.html, 2);
    assert_eq!(stats.failed, 0);

    let seen = hooks.0.lock().unwrap();
    let (requested, served) = &seen[1];
    assert_eq!(requested, &format!("http://{}/old", host));
    assert_eq!(served, &format!("http://{}/new", host));

    // Saved under the requested path, not the redirect target
    assert!(output.path().join("old/index.html").is_file());
    assert!(!output.path().join("new").exists());
}
