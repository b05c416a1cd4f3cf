#![allow(clippy::unwrap_used)]
// Integration tests for `ServiceClient` and the IAM authenticator using wiremock.

use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iamctl_api::{ApiRequest, Authenticator, Credentials, Error, Service, ServiceClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ServiceClient) {
    let server = MockServer::start().await;
    let client = ServiceClient::from_reqwest(
        Service::IamAccessGroups,
        &server.uri(),
        reqwest::Client::new(),
        Authenticator::no_auth(),
    )
    .unwrap();
    (server, client)
}

fn request(method: Method, path: &str) -> ApiRequest {
    let segments = path.split('/').map(str::to_owned).collect();
    ApiRequest::new(method, segments)
}

// ── Success responses ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_captures_etag() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/groups/AccessGroupId-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "W/\"abc\"")
                .set_body_json(json!({ "id": "AccessGroupId-1", "name": "admins" })),
        )
        .mount(&server)
        .await;

    let resp = client
        .send(request(Method::GET, "v2/groups/AccessGroupId-1"))
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.etag.as_deref(), Some("W/\"abc\""));
    assert_eq!(resp.body["name"], "admins");
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/groups/g1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let resp = client
        .send(request(Method::DELETE, "v2/groups/g1"))
        .await
        .unwrap();

    assert_eq!(resp.status, 204);
    assert!(resp.body.is_null());
    assert!(resp.etag.is_none());
}

#[tokio::test]
async fn test_query_headers_and_body_are_sent() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/groups"))
        .and(query_param("account_id", "acct-1"))
        .and(header("Transaction-Id", "tx-42"))
        .and(body_string_contains("\"name\":\"ops\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "g-new" })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .send(
            request(Method::POST, "v2/groups")
                .query("account_id", "acct-1")
                .header("Transaction-Id", "tx-42")
                .json(json!({ "name": "ops" })),
        )
        .await
        .unwrap();

    assert_eq!(resp.body["id"], "g-new");
}

#[tokio::test]
async fn test_segments_are_percent_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send(ApiRequest::new(
            Method::GET,
            vec!["v1".into(), "profiles".into(), "a/b".into()],
        ))
        .await
        .unwrap();
}

// ── Error responses ─────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/groups/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "code": "not_found", "message": "Group missing not found" }],
            "trace": "abc-trace"
        })))
        .mount(&server)
        .await;

    let err = client
        .send(request(Method::GET, "v2/groups/missing"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    match err {
        Error::Api {
            status,
            message,
            code,
            trace,
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Group missing not found");
            assert_eq!(code.as_deref(), Some("not_found"));
            assert_eq!(trace.as_deref(), Some("abc-trace"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_message_passes_through() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/groups/g1"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Something went wrong..." })),
        )
        .mount(&server)
        .await;

    let err = client
        .send(request(Method::GET, "v2/groups/g1"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_ne!(err.status(), Some(404));
    assert!(err.to_string().contains("Something went wrong..."));
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/groups/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client
        .send(request(Method::GET, "v2/groups/g1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

// ── IAM token exchange ──────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_is_exchanged_once_and_sent_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .and(body_string_contains("apikey=secret-key"))
        .and(body_string_contains("grant_type=urn%3Aibm%3Aparams%3Aoauth%3Agrant-type%3Aapikey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-1",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/serviceids/s1"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "s1" })))
        .expect(2)
        .mount(&server)
        .await;

    let credentials =
        Credentials::iam(SecretString::from("secret-key".to_string()), &server.uri()).unwrap();
    let client = ServiceClient::from_reqwest(
        Service::IamIdentity,
        &server.uri(),
        reqwest::Client::new(),
        Authenticator::new(credentials),
    )
    .unwrap();

    for _ in 0..2 {
        client
            .send(request(Method::GET, "v1/serviceids/s1"))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_rejected_api_key_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "BXNIM0415E",
            "errorMessage": "Provided API key could not be found."
        })))
        .mount(&server)
        .await;

    let credentials =
        Credentials::iam(SecretString::from("bad".to_string()), &server.uri()).unwrap();
    let client = ServiceClient::from_reqwest(
        Service::IamIdentity,
        &server.uri(),
        reqwest::Client::new(),
        Authenticator::new(credentials),
    )
    .unwrap();

    let err = client
        .send(request(Method::GET, "v1/serviceids/s1"))
        .await
        .unwrap_err();

    match err {
        Error::Authentication { message } => {
            assert_eq!(message, "Provided API key could not be found.");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}
