//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use listing_ripple::config::{Config, DetailErrorPolicy, OutputFormat};
use listing_ripple::crawler::{Crawler, FetchError};
use listing_ripple::output::export_to_path;
use listing_ripple::CrawlError;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(root_url: &str) -> Config {
    let mut config = Config::default();
    config.site.root_url = root_url.to_string();
    config.site.region_id = 8;
    config.crawler.detail_workers = 3;
    config.crawler.completion_capacity = 4;
    config.crawler.request_timeout_secs = 5;
    config
}

fn root_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

fn listing_body(listings: &[(&str, &str)]) -> String {
    let items: String = listings
        .iter()
        .map(|(href, price)| {
            format!(
                r#"<li>
                    <div class="address"><a href="{}">listing</a></div>
                    <div class="prices">
                        <div class="price"><span>monthly</span></div>
                        <div class="price"><span>{}</span></div>
                    </div>
                </li>"#,
                href, price
            )
        })
        .collect();
    format!(
        r#"<html><body><ul id="photolist">{}</ul></body></html>"#,
        items
    )
}

fn detail_body(addr: &str) -> String {
    format!(
        r#"<html><body><div class="info"><span class="addr">{}</span></div></body></html>"#,
        addr
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

/// Mounts listing page 1 (canonical URL)
async fn mount_first_page(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/house-rentSale.html"))
        .and(query_param("regionid", "8"))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts listing page `page` > 1 (offset URL)
async fn mount_offset_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("firstRow", (20 * (page - 1)).to_string()))
        .and(query_param("regionid", "8"))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, detail_path: &str, addr: &str, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(detail_path))
        .respond_with(html(detail_body(addr)).set_delay(Duration::from_millis(delay_ms)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_two_pages() {
    let mock_server = MockServer::start().await;

    mount_first_page(
        &mock_server,
        listing_body(&[("/a", "10,000"), ("/b", "12,500")]),
    )
    .await;
    mount_offset_page(&mock_server, 2, listing_body(&[("/c", "9,000")])).await;
    mount_offset_page(&mock_server, 3, listing_body(&[])).await;

    // The first listing answers last
    mount_detail(&mock_server, "/a", "Addr-A", 150).await;
    mount_detail(&mock_server, "/b", "Addr-B", 0).await;
    mount_detail(&mock_server, "/c", "Addr-C", 0).await;

    let config = create_test_config(&root_url(&mock_server));
    let crawler = Crawler::new(&config).expect("Failed to create crawler");
    let result = crawler.run().await.expect("Crawl failed");

    assert_eq!(result.page_count(), 2);

    let page1 = result.page(1).expect("page 1 missing");
    assert_eq!(page1.len(), 2);
    let first = page1[0].as_ref().expect("slot 0 empty");
    assert_eq!(first.addr, "Addr-A");
    assert_eq!(first.price, "10,000");
    assert_eq!(page1[1].as_ref().expect("slot 1 empty").addr, "Addr-B");

    let page2 = result.page(2).expect("page 2 missing");
    assert_eq!(page2[0].as_ref().expect("slot 0 empty").addr, "Addr-C");
}

#[tokio::test]
async fn test_empty_first_page_crawls_nothing() {
    let mock_server = MockServer::start().await;
    mount_first_page(&mock_server, listing_body(&[])).await;

    let config = create_test_config(&root_url(&mock_server));
    let result = Crawler::new(&config)
        .expect("Failed to create crawler")
        .run()
        .await
        .expect("Crawl failed");

    assert!(result.is_empty());

    // Only the first listing page was requested
    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording disabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_listing_page_error_aborts() {
    let mock_server = MockServer::start().await;

    mount_first_page(&mock_server, listing_body(&[("/a", "1")])).await;
    mount_offset_page(&mock_server, 2, listing_body(&[("/b", "2")])).await;
    mount_detail(&mock_server, "/a", "Addr-A", 0).await;
    mount_detail(&mock_server, "/b", "Addr-B", 0).await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("firstRow", "40"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&root_url(&mock_server));
    let err = Crawler::new(&config)
        .expect("Failed to create crawler")
        .run()
        .await
        .unwrap_err();

    match err {
        CrawlError::ListingFetch {
            page,
            source: FetchError::Status { status, .. },
        } => {
            assert_eq!(page, 3);
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_detail_error_skipped_when_tolerated() {
    let mock_server = MockServer::start().await;

    mount_first_page(
        &mock_server,
        listing_body(&[("/a", "1"), ("/gone", "2"), ("/c", "3")]),
    )
    .await;
    mount_offset_page(&mock_server, 2, listing_body(&[])).await;
    mount_detail(&mock_server, "/a", "Addr-A", 0).await;
    mount_detail(&mock_server, "/c", "Addr-C", 0).await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&root_url(&mock_server));
    config.crawler.detail_error_policy = DetailErrorPolicy::Skip;

    let result = Crawler::new(&config)
        .expect("Failed to create crawler")
        .run()
        .await
        .expect("Crawl failed");

    let page = result.page(1).expect("page 1 missing");
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].as_ref().expect("slot 0 empty").addr, "Addr-A");
    assert!(page[1].is_none());
    assert_eq!(page[2].as_ref().expect("slot 2 empty").addr, "Addr-C");
}

#[tokio::test]
async fn test_detail_error_fatal_by_default() {
    let mock_server = MockServer::start().await;

    mount_first_page(&mock_server, listing_body(&[("/a", "1"), ("/gone", "2")])).await;
    mount_offset_page(&mock_server, 2, listing_body(&[])).await;
    mount_detail(&mock_server, "/a", "Addr-A", 0).await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&root_url(&mock_server));
    let err = Crawler::new(&config)
        .expect("Failed to create crawler")
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlError::DetailFetch {
            page: 1,
            index: 1,
            ..
        }
    ));
}

#[tokio::test]
async fn test_crawl_then_export_csv() {
    let mock_server = MockServer::start().await;

    mount_first_page(
        &mock_server,
        listing_body(&[("/a", "10,000"), ("/b", "500")]),
    )
    .await;
    mount_offset_page(&mock_server, 2, listing_body(&[])).await;
    mount_detail(&mock_server, "/a", "Addr-A", 40).await;
    mount_detail(&mock_server, "/b", "Addr-B", 0).await;

    let config = create_test_config(&root_url(&mock_server));
    let result = Crawler::new(&config)
        .expect("Failed to create crawler")
        .run()
        .await
        .expect("Crawl failed");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("result.csv");
    export_to_path(&result, OutputFormat::Csv, &out).expect("Export failed");

    let written = std::fs::read_to_string(&out).expect("Failed to read export");
    assert_eq!(written, "Addr-A,\"10,000\"\nAddr-B,500\n");
}
