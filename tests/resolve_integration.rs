//! End-to-end size resolution against mock HTTP servers.
//!
//! Retry tests here sleep for real backoff delays (1s per retry), so attempt
//! budgets are kept small.

mod support;

use std::time::{Duration, Instant};

use remote_size::{
    HttpProbe, ProbeError, SizeError, SizeQuery, SizeResolver, SizeValue, resolve_size,
};
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_resolve_size_reads_head_and_converts() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/archive.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 1536]))
        .mount(&mock_server)
        .await;

    let url = format!("{}/archive.zip", mock_server.uri());

    let kib = resolve_size(&url, "KiB", 20_000, 4).await.unwrap();
    assert_eq!(kib, SizeValue::Quantity(1.5));

    let human = resolve_size(&url, "human", 20_000, 4).await.unwrap();
    assert_eq!(human, SizeValue::Human("1.50 KB".to_string()));
}

#[tokio::test]
async fn test_resolve_size_streams_when_head_has_no_length() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7_u8; 12_345]))
        .mount(&mock_server)
        .await;

    let url = format!("{}/report", mock_server.uri());
    let bytes = resolve_size(&url, "bytes", 20_000, 1).await.unwrap();

    assert_eq!(bytes, SizeValue::Quantity(12_345.0));
}

#[tokio::test]
async fn test_transient_status_is_retried_then_succeeds() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 2048]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/busy", mock_server.uri());
    let started = Instant::now();
    let size = resolve_size(&url, "human", 20_000, 4).await.unwrap();

    assert_eq!(size, SizeValue::Human("2.00 KB".to_string()));
    assert!(
        started.elapsed() >= Duration::from_secs(1),
        "one backoff of 1s expected, took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_persistent_failure_exhausts_attempts() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let url = format!("{}/down", mock_server.uri());
    let error = resolve_size(&url, "bytes", 20_000, 2).await.unwrap_err();

    assert!(
        matches!(
            error,
            SizeError::AttemptsExhausted {
                attempts: 2,
                last_error: ProbeError::UnexpectedStatus { status: 500, .. }
            }
        ),
        "got: {error:?}"
    );
    let msg = error.to_string();
    assert!(msg.contains("after 2 attempts"), "{msg}");
    assert!(msg.contains("HTTP 500"), "{msg}");
}

#[tokio::test]
async fn test_overall_deadline_bounds_the_whole_resolution() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/stalled"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let url = format!("{}/stalled", mock_server.uri());
    let query = SizeQuery::new(&url, "bytes", 300, 3).unwrap();
    let resolver = SizeResolver::new(HttpProbe::new());

    let started = Instant::now();
    let error = resolver.resolve(&query).await.unwrap_err();

    assert!(
        started.elapsed() < Duration::from_secs(3),
        "deadline should stop retries early, took {:?}",
        started.elapsed()
    );
    assert!(
        matches!(
            error,
            SizeError::AttemptsExhausted {
                attempts: 3,
                last_error: ProbeError::DeadlineExceeded { budget_ms: 300, .. }
            }
        ),
        "got: {error:?}"
    );
}

#[tokio::test]
async fn test_overall_deadline_aborts_streaming_fallback() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/generated"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/generated"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0_u8; 4096])
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/generated", mock_server.uri());
    let query = SizeQuery::new(&url, "bytes", 400, 2).unwrap();
    let resolver = SizeResolver::new(HttpProbe::new());

    let started = Instant::now();
    let error = resolver.resolve(&query).await.unwrap_err();

    assert!(
        started.elapsed() < Duration::from_secs(2),
        "deadline should abort the GET, took {:?}",
        started.elapsed()
    );
    assert!(
        matches!(
            error,
            SizeError::AttemptsExhausted {
                attempts: 2,
                last_error: ProbeError::DeadlineExceeded { budget_ms: 400, .. }
            }
        ),
        "got: {error:?}"
    );
}

#[tokio::test]
async fn test_validation_errors_send_no_requests() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/file", mock_server.uri());

    assert!(matches!(
        resolve_size(&url, "parsecs", 20_000, 4).await,
        Err(SizeError::InvalidFormat { .. })
    ));
    assert!(matches!(
        resolve_size(&url, "bytes", -1, 4).await,
        Err(SizeError::InvalidTimeout { timeout_ms: -1 })
    ));
    assert!(matches!(
        resolve_size(&url, "bytes", 1000, 0).await,
        Err(SizeError::InvalidMaxAttempts { max_attempts: 0 })
    ));
    assert!(matches!(
        resolve_size("ftp://x", "bytes", 1000, 4).await,
        Err(SizeError::InvalidUrl { .. })
    ));
}
