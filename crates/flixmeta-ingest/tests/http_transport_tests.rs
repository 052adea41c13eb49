//! HTTP behaviour of the SPARQL transport and retrying client
//!
//! Runs against a local wiremock server standing in for the query service.

use flixmeta_ingest::client::{HttpTransport, MovieQuery, RetryPolicy, RetryingClient, SparqlTransport};
use flixmeta_ingest::config::{EnrichConfig, DEFAULT_USER_AGENT};
use flixmeta_ingest::sparql::{build_query, MovieMetadata};
use flixmeta_ingest::IngestError;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn config_for(server: &MockServer) -> EnrichConfig {
    EnrichConfig::builder()
        .endpoint(format!("{}/sparql", server.uri()))
        .request_timeout(Duration::from_millis(200))
        .max_retries(2)
        .base_backoff(Duration::from_millis(10))
        .build()
}

fn dinosaur_planet() -> serde_json::Value {
    json!({
        "head": {"vars": ["item", "genreLabel", "directorLabel"]},
        "results": {"bindings": [{
            "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q12345"},
            "genreLabel": {"type": "literal", "xml:lang": "en", "value": "Animation"},
            "directorLabel": {"type": "literal", "xml:lang": "en", "value": "Jane Doe"}
        }]}
    })
}

fn movie() -> MovieQuery {
    MovieQuery {
        title: "Dinosaur Planet".to_string(),
        year: 2003,
        sparql: build_query("Dinosaur Planet", 2003),
    }
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_posts_form_with_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("format=json"))
        .and(body_string_contains("Dinosaur+Planet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dinosaur_planet()))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let result = transport.execute(&build_query("Dinosaur Planet", 2003)).await.unwrap();

    let metadata = MovieMetadata::from_result(&result);
    assert_eq!(metadata.external_id.as_deref(), Some("Q12345"));
    assert_eq!(metadata.director.as_deref(), Some("Jane Doe"));
}

#[tokio::test]
async fn test_server_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport.execute("SELECT * WHERE {}").await.unwrap_err();

    match err {
        IngestError::ServiceError { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        },
        other => panic!("expected ServiceError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport.execute("SELECT * WHERE {}").await.unwrap_err();

    assert!(matches!(err, IngestError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(dinosaur_planet())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = transport.execute("SELECT * WHERE {}").await.unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_not_timeout() {
    let config = EnrichConfig::builder()
        .endpoint("http://127.0.0.1:1/sparql")
        .request_timeout(Duration::from_secs(2))
        .build();

    let transport = HttpTransport::new(&config).unwrap();
    let err = transport.execute("SELECT * WHERE {}").await.unwrap_err();

    assert!(matches!(err, IngestError::Http(_)), "got {:?}", err);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = EnrichConfig::builder().user_agent("").build();
    assert!(matches!(HttpTransport::new(&config), Err(IngestError::Config(_))));
}

// ============================================================================
// Retrying client over HTTP
// ============================================================================

#[tokio::test]
async fn test_retries_timeouts_then_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = RetryingClient::new(HttpTransport::new(&config).unwrap(), RetryPolicy::from_config(&config));

    let err = client.fetch(&movie()).await.unwrap_err();

    match err {
        IngestError::ServiceUnavailable { title, year, attempts } => {
            assert_eq!(title, "Dinosaur Planet");
            assert_eq!(year, 2003);
            assert_eq!(attempts, 3);
        },
        other => panic!("expected ServiceUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_500_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = RetryingClient::new(HttpTransport::new(&config).unwrap(), RetryPolicy::from_config(&config));

    let err = client.fetch(&movie()).await.unwrap_err();

    assert!(matches!(err, IngestError::ServiceError { status: 500, .. }));
}
