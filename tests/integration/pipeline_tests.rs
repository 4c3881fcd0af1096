use crate::common::{create_test_config, mount_page, mount_robots, target};
use std::time::Duration;
use sumi_glean::{Pipeline, ResultStatus};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TITLES_PAGE: &str = r#"<html><body>
<h2 class="title">Foo</h2>
<p>ignored</p>
<h2 class="title">Bar</h2>
<h2 class="other">Baz</h2>
</body></html>"#;

#[tokio::test]
async fn test_disallowed_origin_skipped_and_allowed_origin_extracted() {
    let blocked = MockServer::start().await;
    let open = MockServer::start().await;

    mount_robots(&blocked, "User-agent: *\nDisallow: /").await;
    mount_robots(&open, "User-agent: *\nAllow: /").await;
    mount_page(&open, "/news", TITLES_PAGE).await;

    // The disallowed page must never be requested
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TITLES_PAGE))
        .expect(0)
        .mount(&blocked)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[
            target(format!("{}/news", blocked.uri()), "h2", "title"),
            target(format!("{}/news", open.uri()), "h2", "title"),
        ],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.as_slice()[0].status, ResultStatus::SkippedByPolicy);
    assert_eq!(batch.as_slice()[0].content, "");
    assert_eq!(batch.as_slice()[1].status, ResultStatus::Extracted);
    assert_eq!(batch.as_slice()[1].content, "Foo, Bar");
}

#[tokio::test]
async fn test_missing_robots_fails_closed() {
    let server = MockServer::start().await;

    // No robots.txt mounted: the mock server answers 404
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Hi</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/page", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    let result = &batch.as_slice()[0];
    assert_eq!(result.status, ResultStatus::PolicyUnresolvable);
    assert_eq!(result.content, "");
    assert!(result.error.as_deref().unwrap().contains("HTTP 404"));
}

#[tokio::test]
async fn test_malformed_robots_fails_closed() {
    let server = MockServer::start().await;
    mount_robots(&server, "<html><body>Not a robots file</body></html>").await;
    mount_page(&server, "/page", "<h1>Hi</h1>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/page", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    let result = &batch.as_slice()[0];
    assert_eq!(result.status, ResultStatus::PolicyUnresolvable);
    assert!(result.error.as_deref().unwrap().contains("malformed"));
}

#[tokio::test]
async fn test_empty_robots_allows_everything() {
    let server = MockServer::start().await;
    mount_robots(&server, "").await;
    mount_page(&server, "/page", "<h1>Open</h1>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/page", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].status, ResultStatus::Extracted);
    assert_eq!(batch.as_slice()[0].content, "Open");
}

#[tokio::test]
async fn test_robots_fetched_once_per_origin() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", "<h1>A</h1>").await;
    mount_page(&server, "/b", "<h1>B</h1>").await;
    mount_page(&server, "/c", "<h1>C</h1>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "concurrency = 4",
        false,
        &[
            target(format!("{}/a", server.uri()), "h1", ""),
            target(format!("{}/private/x", server.uri()), "h1", ""),
            target(format!("{}/b", server.uri()), "h1", ""),
            target(format!("{}/c", server.uri()), "h1", ""),
        ],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    let statuses: Vec<_> = batch.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            ResultStatus::Extracted,
            ResultStatus::SkippedByPolicy,
            ResultStatus::Extracted,
            ResultStatus::Extracted,
        ]
    );
    let contents: Vec<_> = batch.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["A", "", "B", "C"]);
}

#[tokio::test]
async fn test_server_error_does_not_affect_other_targets() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/before", "<h1>Before</h1>").await;
    mount_page(&server, "/after", "<h1>After</h1>").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[
            target(format!("{}/before", server.uri()), "h1", ""),
            target(format!("{}/broken", server.uri()), "h1", ""),
            target(format!("{}/after", server.uri()), "h1", ""),
        ],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].content, "Before");
    assert_eq!(batch.as_slice()[1].status, ResultStatus::FetchFailed);
    assert_eq!(batch.as_slice()[1].content, "");
    assert_eq!(batch.as_slice()[1].error.as_deref(), Some("HTTP 500"));
    assert_eq!(batch.as_slice()[2].content, "After");
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<h1>Too late</h1>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "timeout-secs = 1\nconnect-timeout-secs = 1",
        false,
        &[target(format!("{}/slow", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    let result = &batch.as_slice()[0];
    assert_eq!(result.status, ResultStatus::FetchFailed);
    assert!(result.error.as_deref().unwrap().starts_with("network error"));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "<h1>Recovered</h1>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "max-attempts = 3\nretry-delay-ms = 10",
        false,
        &[target(format!("{}/flaky", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].status, ResultStatus::Extracted);
    assert_eq!(batch.as_slice()[0].content, "Recovered");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "max-attempts = 3\nretry-delay-ms = 10",
        false,
        &[target(format!("{}/gone", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].status, ResultStatus::FetchFailed);
    assert_eq!(batch.as_slice()[0].error.as_deref(), Some("HTTP 404"));
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<h1>Moved</h1>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/old", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].content, "Moved");
}

#[tokio::test]
async fn test_requests_identify_the_crawler() {
    let server = MockServer::start().await;
    let agent = "TestBot/1.0.0 (+https://example.com/contact; test@example.com)";

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("user-agent", agent))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", agent))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Polite</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/page", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].content, "Polite");
}

#[tokio::test]
async fn test_separate_runs_fetch_robots_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/page", "<h1>Same</h1>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/page", server.uri()), "h1", "")],
    );
    let targets = config.build_targets().unwrap();

    let pipeline = Pipeline::from_config(&config).unwrap();
    let first = pipeline.run(&targets).await.unwrap();
    let second = pipeline.run(&targets).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_no_content_robots_fails_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Hi</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[target(format!("{}/page", server.uri()), "h1", "")],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    let result = &batch.as_slice()[0];
    assert_eq!(result.status, ResultStatus::PolicyUnresolvable);
    assert_eq!(result.content, "");
    assert!(result.error.as_deref().unwrap().contains("HTTP 204"));
}

/// "Новини" in windows-1251
const NOVINI_CP1251: [u8; 6] = [0xCD, 0xEE, 0xE2, 0xE8, 0xED, 0xE8];

fn cp1251_body(head: &str) -> Vec<u8> {
    let mut body = format!("<html><head>{}</head><body><h1>", head).into_bytes();
    body.extend_from_slice(&NOVINI_CP1251);
    body.extend_from_slice(b"</h1></body></html>");
    body
}

#[tokio::test]
async fn test_windows_1251_pages_are_decoded() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/header"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(cp1251_body(""))
                .insert_header("content-type", "text/html; charset=windows-1251"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(cp1251_body(r#"<meta charset="windows-1251">"#))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        dir.path(),
        "",
        false,
        &[
            target(format!("{}/header", server.uri()), "h1", ""),
            target(format!("{}/meta", server.uri()), "h1", ""),
        ],
    );

    let pipeline = Pipeline::from_config(&config).unwrap();
    let batch = pipeline.run(&config.build_targets().unwrap()).await.unwrap();

    assert_eq!(batch.as_slice()[0].content, "Новини");
    assert_eq!(batch.as_slice()[1].content, "Новини");
}
