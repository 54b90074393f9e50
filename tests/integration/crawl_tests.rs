//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a SQLite file and a
//! documents directory in a temporary location.

use ripple_frontier::archive::encode_key;
use ripple_frontier::config::{
    ArchiveConfig, Config, CrawlerConfig, FetchConfig, SeedConfig, StorageConfig, UserAgentConfig,
};
use ripple_frontier::crawler::crawl;
use ripple_frontier::storage::{SqliteStorage, Storage, VisitedRecord};
use ripple_frontier::{CrawlReport, UrlHash};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME: &str = r#"<html><body>
    <h1>Home</h1>
    <p>Welcome home</p>
    <a href="/page1">Page 1</a>
    <a href="/page2">Page 2</a>
    <a href="/logo.png">Logo</a>
    <a href="/missing">Gone</a>
    <a href="/">Home</a>
    </body></html>"#;

const PAGE1: &str = r#"<html><body>
    <h1>First</h1>
    <p>The first page</p>
    <a href="/">Back</a>
    </body></html>"#;

/// Creates a test configuration rooted in `dir`
fn create_test_config(dir: &Path, seeds: Vec<String>) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 3,
            frontier_capacity: 40,
            wait_timeout_ms: 50, // Very short for testing
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
            max_redirects: 5,
        },
        storage: StorageConfig {
            database_path: dir.join("frontier.db").to_string_lossy().into_owned(),
            max_retries: 3,
            retry_backoff_ms: 10,
        },
        archive: ArchiveConfig {
            documents_dir: dir.join("Documents").to_string_lossy().into_owned(),
        },
        seeds: SeedConfig {
            urls: seeds,
            file: None,
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Mounts the test site: a home page, a distinct page, a mirror of the
/// home page, a binary asset and (implicitly) a 404
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(HOME))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(PAGE1))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(HOME))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
        )
        .mount(server)
        .await;
}

/// Polls until the server has seen `expected` requests
async fn wait_for_requests(server: &MockServer, expected: usize) {
    for _ in 0..500 {
        let seen = server.received_requests().await.map_or(0, |r| r.len());
        if seen >= expected {
            // Give the workers time to finish handling the last responses
            tokio::time::sleep(Duration::from_millis(200)).await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server never saw {} requests", expected);
}

async fn run_until<F, Fut>(config: &Config, fresh: bool, until: F) -> CrawlReport
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let cancel = CancellationToken::new();
    let crawl_config = config.clone();
    let token = cancel.clone();
    let handle = tokio::spawn(async move { crawl(&crawl_config, fresh, token).await });

    until().await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("crawl did not stop after cancellation")
        .expect("crawl task panicked")
        .expect("crawl failed")
}

fn archived_document(config: &Config, url: &str) -> Option<serde_json::Value> {
    let path = Path::new(&config.archive.documents_dir).join(format!("{}.json", encode_key(url)));
    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[tokio::test]
async fn test_full_crawl_dedups_urls_and_content() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), vec![format!("{}/", base_url)]);

    // Home, page1, page2, logo and missing; each exactly once
    let report = run_until(&config, false, || wait_for_requests(&mock_server, 5)).await;

    assert_eq!(report.archived, 2);
    assert_eq!(report.duplicates, 1, "the mirror page should be skipped");
    assert_eq!(report.fetch_failures, 2, "binary and 404 are dropped");
    assert_eq!(report.archive_failures, 0);

    let requests = mock_server.received_requests().await.unwrap();
    let mut paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/", "/logo.png", "/missing", "/page1", "/page2"]);

    let home = archived_document(&config, &format!("{}/", base_url)).expect("home not archived");
    assert_eq!(home["url"], format!("{}/", base_url));
    assert!(home["document"].as_str().unwrap().contains("Welcome home"));
    assert!(archived_document(&config, &format!("{}/page1", base_url)).is_some());
    assert!(archived_document(&config, &format!("{}/page2", base_url)).is_none());
    assert!(archived_document(&config, &format!("{}/logo.png", base_url)).is_none());

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap();
    assert_eq!(storage.count_visited().unwrap(), 2);
    assert!(storage
        .contains_url_hash(UrlHash::of(&format!("{}/page1", base_url)).as_str())
        .unwrap());
    assert!(!storage
        .contains_url_hash(UrlHash::of(&format!("{}/page2", base_url)).as_str())
        .unwrap());
}

#[tokio::test]
async fn test_restart_resumes_from_durable_queue() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // The seed was handled by an earlier run; it must not be fetched again
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(HOME))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(PAGE1))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let home_url = format!("{}/", base_url);
    let config = create_test_config(dir.path(), vec![home_url.clone()]);

    {
        let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap();
        storage
            .insert_visited_if_absent(&VisitedRecord {
                url_hash: UrlHash::of(&home_url).as_str().to_string(),
                url: home_url.clone(),
                fingerprint: "earlier".to_string(),
                visited_at: "2024-01-01T00:00:00Z".to_string(),
            })
            .unwrap();
        storage
            .enqueue_many(&[format!("{}/page1", base_url)])
            .unwrap();
    }

    let report = run_until(&config, false, || wait_for_requests(&mock_server, 1)).await;

    assert_eq!(report.archived, 1);
    assert!(archived_document(&config, &format!("{}/page1", base_url)).is_some());

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap();
    assert_eq!(storage.count_visited().unwrap(), 2);
}

#[tokio::test]
async fn test_fresh_start_discards_previous_state() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>only page</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let home_url = format!("{}/", base_url);
    let config = create_test_config(dir.path(), vec![home_url.clone()]);

    {
        let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap();
        storage
            .insert_visited_if_absent(&VisitedRecord {
                url_hash: UrlHash::of(&home_url).as_str().to_string(),
                url: home_url.clone(),
                fingerprint: "stale".to_string(),
                visited_at: "2024-01-01T00:00:00Z".to_string(),
            })
            .unwrap();
        storage
            .enqueue_many(&["http://127.0.0.1:9/unreachable".to_string()])
            .unwrap();
    }

    let report = run_until(&config, true, || wait_for_requests(&mock_server, 1)).await;

    assert_eq!(report.archived, 1);
    assert_eq!(report.fetch_failures, 0);

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap();
    assert_eq!(storage.count_visited().unwrap(), 1);
    let latest = storage.latest_visit().unwrap().unwrap();
    assert_ne!(latest.fingerprint, "stale");
}
