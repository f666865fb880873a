use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use news_digest::core::renderer::extract_embedded_literal;
use news_digest::domain::model::{DegradeReason, FeedSource};
use news_digest::{DigestConfig, DigestEngine, DigestPipeline, FixedClock, LocalStorage};
use tempfile::TempDir;

const THREE_ITEM_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Feed A</title>
    <link>https://a.example.com</link>
    <description>A</description>
    <item><title>Chip exports tighten</title><link>https://a.example.com/1</link><description>Export rules.</description></item>
    <item><title>Central bank holds rates</title><link>https://a.example.com/2</link></item>
    <item><title>New console announced</title><link>https://a.example.com/3</link></item>
  </channel>
</rss>"#;

const MODEL_REPLY: &str = "## Section\n* item - [x](y)";

fn test_config(server: &MockServer, output_dir: &str, sources: Vec<FeedSource>) -> DigestConfig {
    let mut config = DigestConfig::default();
    config.sources = sources;
    config.collect.timeout_seconds = 5;
    config.summarize.api_base = server.base_url();
    config.summarize.timeout_seconds = 5;
    config.publish.output_dir = output_dir.to_string();
    config
}

fn clock(day: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 10, day, 0, 30, 0).unwrap())
}

fn embedded_markdown(html: &str) -> String {
    let literal = extract_embedded_literal(html).expect("page embeds a markdown literal");
    serde_json::from_str(literal).expect("literal decodes as JSON")
}

async fn mock_feed(server: &MockServer, path: &'static str, body: &'static str) {
    server
        .mock_async(move |when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("Content-Type", "application/rss+xml")
                .body(body);
        })
        .await;
}

#[tokio::test]
async fn test_end_to_end_briefing_is_embedded_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;
    let completion_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer test-key")
                .body_contains("【信源：A】")
                .body_contains("Central bank holds rates");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": MODEL_REPLY}}]
            }));
        })
        .await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );
    let storage = LocalStorage::new(output_dir.clone());
    let pipeline =
        DigestPipeline::with_clock(&config, storage, Some("test-key".to_string()), clock(19))
            .unwrap();
    let outcome = DigestEngine::new(pipeline).run().await.unwrap();

    completion_mock.assert_async().await;
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.entries_collected, 3);

    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert_eq!(embedded_markdown(&html), MODEL_REPLY);

    let archive = temp_dir.path().join("archive").join("2026-10-19.html");
    assert!(archive.exists());
    assert_eq!(
        embedded_markdown(&std::fs::read_to_string(archive).unwrap()),
        MODEL_REPLY
    );
    assert!(temp_dir.path().join("archive").join("index.html").exists());
}

#[tokio::test]
async fn test_broken_feed_publishes_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/b.xml", "{\"version\": \"https://jsonfeed.org/version/1\", \"items\": [").await;
    let completion_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200);
        })
        .await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("B", server.url("/b.xml"))],
    );
    let placeholder = config.render.placeholder_text.clone();
    let pipeline = DigestPipeline::with_clock(
        &config,
        LocalStorage::new(output_dir),
        Some("test-key".to_string()),
        clock(19),
    )
    .unwrap();
    let outcome = DigestEngine::new(pipeline).run().await.unwrap();

    assert_eq!(completion_mock.hits_async().await, 0);
    assert_eq!(outcome.degraded, Some(DegradeReason::NoFeedContent));
    assert_eq!(outcome.sources_failed, 1);

    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert_eq!(embedded_markdown(&html), placeholder);
}

#[tokio::test]
async fn test_missing_credential_publishes_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;
    let completion_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200);
        })
        .await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );
    let placeholder = config.render.summary_failed_text.clone();
    let pipeline =
        DigestPipeline::with_clock(&config, LocalStorage::new(output_dir), None, clock(19))
            .unwrap();
    let outcome = DigestEngine::new(pipeline).run().await.unwrap();

    assert_eq!(completion_mock.hits_async().await, 0);
    assert_eq!(outcome.degraded, Some(DegradeReason::MissingCredential));

    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert_eq!(embedded_markdown(&html), placeholder);
}

#[tokio::test]
async fn test_model_failure_still_writes_page() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500);
        })
        .await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );
    let pipeline = DigestPipeline::with_clock(
        &config,
        LocalStorage::new(output_dir),
        Some("test-key".to_string()),
        clock(19),
    )
    .unwrap();
    let outcome = DigestEngine::new(pipeline).run().await.unwrap();

    assert!(matches!(outcome.degraded, Some(DegradeReason::SummarizerFailed(_))));
    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert_eq!(embedded_markdown(&html), config.render.summary_failed_text);
}

#[tokio::test]
async fn test_backticks_in_briefing_are_escaped() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();
    let reply = "## Tech\n* `rustc` 1.90 released - [notes](https://example.com)";

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;
    server
        .mock_async(move |when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"content": reply}}]
            }));
        })
        .await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );
    let pipeline = DigestPipeline::with_clock(
        &config,
        LocalStorage::new(output_dir),
        Some("test-key".to_string()),
        clock(19),
    )
    .unwrap();
    DigestEngine::new(pipeline).run().await.unwrap();

    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    let literal = extract_embedded_literal(&html).unwrap();
    assert!(!literal.contains('`'));
    assert_eq!(embedded_markdown(&html), reply);
}

#[tokio::test]
async fn test_reruns_are_idempotent_and_archives_do_not_collide() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"content": MODEL_REPLY}}]
            }));
        })
        .await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );

    let mut current_pages = Vec::new();
    for day in [18, 18, 19] {
        let pipeline = DigestPipeline::with_clock(
            &config,
            LocalStorage::new(output_dir.clone()),
            Some("test-key".to_string()),
            clock(day),
        )
        .unwrap();
        DigestEngine::new(pipeline).run().await.unwrap();
        current_pages.push(std::fs::read(temp_dir.path().join("index.html")).unwrap());
    }

    assert_eq!(current_pages[0], current_pages[1]);

    let archive_dir = temp_dir.path().join("archive");
    let day18 = std::fs::read_to_string(archive_dir.join("2026-10-18.html")).unwrap();
    let day19 = std::fs::read_to_string(archive_dir.join("2026-10-19.html")).unwrap();
    assert!(day18.contains("2026年10月18日"));
    assert!(day19.contains("2026年10月19日"));

    let index = std::fs::read_to_string(archive_dir.join("index.html")).unwrap();
    let newest = index.find("2026-10-19.html").unwrap();
    let oldest = index.find("2026-10-18.html").unwrap();
    assert!(newest < oldest);
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"file").unwrap();
    let output_dir = blocker.to_str().unwrap().to_string();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );
    let pipeline =
        DigestPipeline::with_clock(&config, LocalStorage::new(output_dir), None, clock(19))
            .unwrap();
    let err = DigestEngine::new(pipeline).run().await.unwrap_err();

    assert_ne!(err.exit_code(), 0);
}

#[tokio::test]
async fn test_archive_failure_keeps_published_page() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();
    std::fs::write(temp_dir.path().join("archive"), b"not a directory").unwrap();

    let server = MockServer::start_async().await;
    mock_feed(&server, "/a.xml", THREE_ITEM_RSS).await;

    let config = test_config(
        &server,
        &output_dir,
        vec![FeedSource::new("A", server.url("/a.xml"))],
    );
    let pipeline =
        DigestPipeline::with_clock(&config, LocalStorage::new(output_dir), None, clock(19))
            .unwrap();
    let outcome = DigestEngine::new(pipeline).run().await.unwrap();

    assert!(outcome.page.archive_path.is_none());
    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert_eq!(embedded_markdown(&html), config.render.summary_failed_text);
    assert!(temp_dir.path().join("archive").is_file());
}
