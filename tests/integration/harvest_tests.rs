//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small catalog and run the full
//! pipeline end-to-end against a temporary store and output file.

use std::path::Path;
use sumi_harvest::config::{hash_content, Config, CrawlerConfig, OutputConfig, SiteConfig};
use sumi_harvest::crawler::{discover_pages, parse_product_urls, Fetcher, Harvester};
use sumi_harvest::storage::{RecordStore, RunStatus, SqliteStore};
use sumi_harvest::{harvest, HarvestError};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for one category on the mock server
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            batch_size: 2,
            request_timeout_secs: 5,
        },
        site: SiteConfig {
            base_url: server.uri(),
            manufacturer: "Apple".to_string(),
            currency_suffix: "грн.".to_string(),
            categories: vec![format!("{}/mac", server.uri())],
        },
        output: OutputConfig {
            store_path: dir.path().join("harvest.db").to_string_lossy().into_owned(),
            csv_path: dir.path().join("harvest.csv").to_string_lossy().into_owned(),
            delimiter: ";".to_string(),
        },
    }
}

fn listing_page(products: &[String], with_pagination: bool) -> String {
    let links: String = products
        .iter()
        .map(|href| format!(r#"<div class="product-name"><a href="{}">item</a></div>"#, href))
        .collect();
    let pagination = if with_pagination {
        r#"<ul class="pagination"><li class="active"><span>1</span></li><li><a href="/mac?page=2">2</a></li></ul>"#
    } else {
        ""
    };
    format!("<html><body>{}{}</body></html>", links, pagination)
}

fn product_page(name: &str, price: &str, characteristics: &[(&str, &str)]) -> String {
    let rows: String = characteristics
        .iter()
        .map(|(key, value)| {
            format!(
                r#"<tr><td class="cell-4"><span>{}:</span></td><td class="cell-8"><span>{}</span></td></tr>"#,
                key, value
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <ul class="breadcrumb">
            <li itemprop="itemListElement"><a href="/"><span itemprop="name">Home</span></a></li>
            <li itemprop="itemListElement"><a href="/apple"><span itemprop="name">Apple</span></a></li>
            <li itemprop="itemListElement"><a href="/mac"><span itemprop="name">Mac</span></a></li>
        </ul>
        <h1 itemprop="name">{}</h1>
        <div class="price"><span>{} грн.</span></div>
        <div itemprop="description">About {}</div>
        <div id="tab-description"><table><tbody>{}</tbody></table></div>
        </body></html>"#,
        name, price, name, rows
    )
}

async fn mount_product(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// One category, two listing pages, three products
async fn mount_catalog(server: &MockServer) {
    // Second listing page first: the catch-all below also matches /mac
    Mock::given(method("GET"))
        .and(path("/mac"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&["/p/imac".to_string()], true)),
        )
        .mount(server)
        .await;

    // Category root and first listing page share markup
    Mock::given(method("GET"))
        .and(path("/mac"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &[
                "/p/air".to_string(),
                format!("{}/p/pro", server.uri()),
            ],
            true,
        )))
        .mount(server)
        .await;

    mount_product(
        server,
        "/p/air",
        product_page("MacBook Air", "32999", &[("Color", "silver"), ("Weight", "1.29 kg")]),
    )
    .await;
    mount_product(
        server,
        "/p/pro",
        product_page("MacBook Pro", "64999", &[("Color", "space gray"), ("Storage", "512 GB")]),
    )
    .await;
    mount_product(server, "/p/imac", product_page("iMac", "54999", &[])).await;
}

fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .expect("Failed to open output table");

    let header = reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("Failed to read row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();

    (header, rows)
}

fn column(header: &[String], name: &str) -> usize {
    header
        .iter()
        .position(|c| c == name)
        .unwrap_or_else(|| panic!("missing column {}", name))
}

#[tokio::test]
async fn test_full_harvest_writes_unified_table() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);
    let csv_path = dir.path().join("harvest.csv");

    let summary = harvest(config, &hash_content("catalog"), false)
        .await
        .expect("Harvest should succeed");

    assert_eq!(summary.listing_pages, 2);
    assert_eq!(summary.products_discovered, 3);

    let (header, rows) = read_table(&csv_path);

    // 10 fixed columns + Color, Weight, Storage
    assert_eq!(header.len(), 13);
    assert_eq!(&header[..3], &["url", "Image", "Name"]);
    assert_eq!(&header[10..], &["Color", "Weight", "Storage"]);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.len() == header.len()));

    let name = column(&header, "Name");
    let names: Vec<_> = rows.iter().map(|row| row[name].as_str()).collect();
    assert_eq!(names, vec!["MacBook Air", "MacBook Pro", "iMac"]);

    let url = column(&header, "url");
    assert_eq!(rows[0][url], format!("{}/p/air", server.uri()));
    assert_eq!(rows[1][url], format!("{}/p/pro", server.uri()));

    let price = column(&header, "Price");
    assert_eq!(rows[0][price], "32999 ");

    let storage = column(&header, "Storage");
    assert_eq!(rows[0][storage], "");
    assert_eq!(rows[1][storage], "512 GB");
    assert_eq!(rows[2][column(&header, "Color")], "");

    let category = column(&header, "Category");
    assert_eq!(rows[2][category], "Apple");
    assert_eq!(rows[2][column(&header, "Manufacturer")], "Apple");
}

#[tokio::test]
async fn test_completed_run_recorded_in_store() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);
    let store_path = dir.path().join("harvest.db");

    let summary = harvest(config, &hash_content("catalog"), false).await.unwrap();

    let store = SqliteStore::new(&store_path).unwrap();
    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, summary.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.finished_at.is_some());
    assert_eq!(store.count_records(run.id).unwrap(), 3);
}

#[tokio::test]
async fn test_category_without_pagination_has_one_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/imac"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&["/p/imac".to_string()], false)),
        )
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    let fetcher = Fetcher::new(&config.crawler).unwrap();
    let category = format!("{}/imac", server.uri());
    let pages = discover_pages(&fetcher, &category).await.unwrap();

    assert_eq!(pages, vec![format!("{}?page=1", category)]);
}

#[test]
fn test_relative_and_absolute_links_resolved() {
    let base = Url::parse("https://apolo.com.ua").unwrap();
    let html = listing_page(
        &[
            "/AppleCo/macbook-air/mba-m1".to_string(),
            "https://apolo.com.ua/AppleCo/imac/imac-24".to_string(),
        ],
        false,
    );

    assert_eq!(
        parse_product_urls(&html, &base),
        vec![
            "https://apolo.com.ua/AppleCo/macbook-air/mba-m1",
            "https://apolo.com.ua/AppleCo/imac/imac-24",
        ]
    );
}

#[tokio::test]
async fn test_duplicate_links_are_harvested_twice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mac"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["/p/air".to_string(), "/p/air".to_string()],
            false,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/air"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("MacBook Air", "1", &[])),
        )
        .expect(2)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    let summary = harvest(config, &hash_content("dupes"), false).await.unwrap();

    assert_eq!(summary.products_discovered, 2);
    assert_eq!(summary.export.rows, 2);
}

#[tokio::test]
async fn test_server_error_aborts_without_table() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/p/imac"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    let err = harvest(config, &hash_content("catalog"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::HttpStatus { status: 500, .. }));
    assert!(!dir.path().join("harvest.csv").exists());

    // The first wave made it to the store before the failing one
    let store = SqliteStore::new(&dir.path().join("harvest.db")).unwrap();
    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Running);
    assert_eq!(store.count_records(run.id).unwrap(), 2);
}

#[tokio::test]
async fn test_interrupted_run_resumes() {
    let server = MockServer::start().await;

    // Fails once, then the catalog mock below serves it
    Mock::given(method("GET"))
        .and(path("/p/imac"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_catalog(&server).await;

    let dir = TempDir::new().unwrap();
    let hash = hash_content("catalog");

    let first = harvest(create_test_config(&server, &dir), &hash, false).await;
    assert!(first.is_err());

    let summary = harvest(create_test_config(&server, &dir), &hash, false)
        .await
        .expect("Resumed harvest should succeed");

    assert_eq!(summary.products_resumed, 2);
    assert_eq!(summary.products_extracted, 1);
    assert_eq!(summary.export.rows, 3);

    let (header, rows) = read_table(&dir.path().join("harvest.csv"));
    let name = column(&header, "Name");
    let names: Vec<_> = rows.iter().map(|row| row[name].as_str()).collect();
    assert_eq!(names, vec!["MacBook Air", "MacBook Pro", "iMac"]);
}

#[tokio::test]
async fn test_fresh_run_after_completion() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let dir = TempDir::new().unwrap();
    let hash = hash_content("catalog");

    let first = harvest(create_test_config(&server, &dir), &hash, false)
        .await
        .unwrap();

    // A completed run is never resumed, fresh or not
    let mut harvester = Harvester::new(create_test_config(&server, &dir), &hash, false).unwrap();
    assert_ne!(harvester.run_id(), first.run_id);

    let second = harvester.run().await.unwrap();
    assert_eq!(second.products_resumed, 0);
    assert_eq!(second.products_extracted, 3);
    assert_eq!(second.export.rows, 3);
}
