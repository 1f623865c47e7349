//! Transport-level tests against a stub HTTP server: signing on the wire,
//! the retry loop's attempt accounting, error decoding, and the exact
//! query-string rendering of operation discriminators.

mod common;

use std::time::Duration;

use common::{http_response, ok_response, StubServer};
use mochow::{
    BackOffRetryPolicy, ClientConfiguration, Credentials, Error, MochowClient, NoRetryPolicy,
    ServerErrCode,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn client_for(endpoint: &str, credentials: Credentials) -> MochowClient {
    let config = ClientConfiguration::new(credentials, endpoint)
        .with_connection_timeout_ms(5_000)
        .with_retry_policy(NoRetryPolicy);
    MochowClient::new(config).expect("client")
}

fn header_value(request: &str, name: &str) -> Option<String> {
    request.lines().find_map(|line| {
        let (header, value) = line.split_once(':')?;
        header
            .trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

#[test]
fn test_create_database_request_shape() {
    init_logging();
    let server = StubServer::start(vec![ok_response(r#"{"code":0,"msg":"success"}"#)]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    client.create_database("book", None).expect("create");

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    // Discriminator is a bare key, no '='.
    assert!(
        request.starts_with("POST /v1/database?create HTTP/1.1"),
        "unexpected request line: {request}"
    );
    assert_eq!(
        header_value(request, "authorization").as_deref(),
        Some("Bearer account=root&api_key=secret")
    );
    assert!(header_value(request, "x-bce-date").is_some());
    assert!(header_value(request, "user-agent")
        .is_some_and(|ua| ua.starts_with("mochow-rust/")));
    assert!(request.ends_with(r#"{"database":"book"}"#));
}

#[test]
fn test_appbuilder_credentials_emit_second_header() {
    let server = StubServer::start(vec![ok_response(r#"{"code":0,"msg":"success"}"#)]);
    let client = client_for(
        &server.endpoint,
        Credentials::with_appbuilder_token("root", "secret", "ab-token"),
    );

    client.create_database("book", None).expect("create");

    let requests = server.finish();
    assert_eq!(
        header_value(&requests[0], "x-appbuilder-authorization").as_deref(),
        Some("Bearer ab-token")
    );
    assert_eq!(
        header_value(&requests[0], "authorization").as_deref(),
        Some("Bearer account=root&api_key=secret")
    );
}

#[test]
fn test_drop_database_is_delete_with_valued_param() {
    let server = StubServer::start(vec![
        // list (for the lookup), then the delete itself
        ok_response(r#"{"code":0,"msg":"success","databases":["book"]}"#),
        ok_response(r#"{"code":0,"msg":"success"}"#),
    ]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    client.drop_database("book", None).expect("drop");

    let requests = server.finish();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("POST /v1/database?list HTTP/1.1"));
    assert!(requests[1].starts_with("DELETE /v1/database?database=book HTTP/1.1"));
}

#[test]
fn test_list_databases_decodes_payload() {
    let server = StubServer::start(vec![ok_response(
        r#"{"code":0,"msg":"success","databases":["book","film"]}"#,
    )]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    let databases = client.list_databases(None).expect("list");
    let names: Vec<&str> = databases.iter().map(|db| db.database_name()).collect();
    assert_eq!(names, vec!["book", "film"]);
    server.finish();
}

#[test]
fn test_server_error_body_is_decoded() {
    let server = StubServer::start(vec![http_response(
        400,
        "Bad Request",
        &[("X-Bce-Request-Id", "req-42")],
        r#"{"msg":"database already exist","code":51}"#,
    )]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    let err = client.create_database("book", None).unwrap_err();
    match err {
        Error::Server {
            status_code,
            code,
            message,
            request_id,
        } => {
            assert_eq!(status_code, 400);
            assert_eq!(code, Some(ServerErrCode::DbAlreadyExist));
            assert_eq!(message, "database already exist");
            assert_eq!(request_id.as_deref(), Some("req-42"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
    server.finish();
}

#[test]
fn test_empty_error_body_falls_back_to_reason_phrase() {
    let server = StubServer::start(vec![http_response(
        404,
        "Not Found",
        &[("X-Bce-Request-Id", "req-7")],
        "",
    )]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    let err = client.create_database("book", None).unwrap_err();
    match err {
        Error::Server {
            code,
            message,
            request_id,
            ..
        } => {
            assert_eq!(code, None);
            assert_eq!(message, "Not Found");
            assert_eq!(request_id.as_deref(), Some("req-7"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
    server.finish();
}

#[test]
fn test_backoff_policy_attempt_count_and_last_error() {
    init_logging();
    let error_body = r#"{"msg":"internal error","code":1}"#;
    let responses: Vec<String> = (0..3)
        .map(|_| http_response(500, "Internal Server Error", &[], error_body))
        .collect();
    let server = StubServer::start(responses);

    let config = ClientConfiguration::new(Credentials::new("root", "secret"), &server.endpoint)
        .with_retry_policy(BackOffRetryPolicy::new(
            2,
            Duration::from_millis(10),
            Duration::from_millis(1),
        ));
    let client = MochowClient::new(config).expect("client");

    let err = client.create_database("book", None).unwrap_err();
    // 1 initial attempt + 2 retries, then the last server error surfaces
    // unwrapped.
    let requests = server.finish();
    assert_eq!(requests.len(), 3);
    assert!(err.is_server_code(ServerErrCode::InternalError));
}

#[test]
fn test_no_retry_policy_issues_single_attempt() {
    let server = StubServer::start(vec![http_response(
        503,
        "Service Unavailable",
        &[],
        r#"{"msg":"overloaded","code":1}"#,
    )]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    let err = client.create_database("book", None).unwrap_err();
    assert!(matches!(err, Error::Server { status_code: 503, .. }));
    assert_eq!(server.finish().len(), 1);
}

#[test]
fn test_non_transient_status_is_not_retried() {
    // 400 is not in the transient set, so even the back-off policy must
    // surface it after one attempt.
    let server = StubServer::start(vec![http_response(
        400,
        "Bad Request",
        &[],
        r#"{"msg":"bad parameter","code":2}"#,
    )]);
    let config = ClientConfiguration::new(Credentials::new("root", "secret"), &server.endpoint)
        .with_retry_policy(BackOffRetryPolicy::new(
            5,
            Duration::from_millis(10),
            Duration::from_millis(1),
        ));
    let client = MochowClient::new(config).expect("client");

    let err = client.create_database("book", None).unwrap_err();
    assert!(err.is_server_code(ServerErrCode::InvalidParameter));
    assert_eq!(server.finish().len(), 1);
}

#[test]
fn test_closed_client_fails_fast_without_network() {
    let server = StubServer::start(vec![ok_response(r#"{"code":0,"msg":"success"}"#)]);
    let client = client_for(&server.endpoint, Credentials::new("root", "secret"));

    client.close();
    let err = client.create_database("book", None).unwrap_err();
    assert!(matches!(err, Error::Client(message) if message.contains("conn is closed")));
    assert!(server.requests_so_far().is_empty());
}

#[test]
fn test_transport_error_surfaces_raw_after_exhaustion() {
    // Nothing listens on this port; the raw reqwest error must propagate
    // (no wrapper type), after exactly 1 + retries attempts worth of
    // delay.
    let config = ClientConfiguration::new(
        Credentials::new("root", "secret"),
        "http://127.0.0.1:9",
    )
    .with_connection_timeout_ms(200)
    .with_retry_policy(BackOffRetryPolicy::new(
        1,
        Duration::from_millis(5),
        Duration::from_millis(1),
    ));
    let client = MochowClient::new(config).expect("client");

    let err = client.create_database("book", None).unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
