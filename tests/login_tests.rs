// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token lifecycle and privileged login tests against a mock service.

use serde_json::json;
use uservoice::{Client, ClientConfig, Error, Protocol};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a client whose subdomain + domain concatenation resolves to the
/// mock server's host (`127` + `0.0.1:port` = `127.0.0.1:port`).
fn client_for(server: &MockServer) -> Client {
    let config = ClientConfig {
        protocol: Protocol::Http,
        uservoice_domain: format!("0.0.1:{}", server.address().port()),
        callback: Some("https://app.example.com/callback".to_string()),
        ..Default::default()
    };
    Client::new("127", "consumer_key", "consumer_secret", config).expect("client builds")
}

async fn mount_request_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("oauth_token=rt&oauth_token_secret=rts"),
        )
        .mount(server)
        .await;
}

fn authorization_of(request: &wiremock::Request) -> String {
    request
        .headers
        .get("authorization")
        .expect("request is signed")
        .to_str()
        .expect("header is ASCII")
        .to_string()
}

#[tokio::test]
async fn test_request_token_is_fetched_and_cached() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;

    let mut client = client_for(&server);
    let first = client.request_token().await.expect("request token");
    let second = client.request_token().await.expect("cached request token");

    assert_eq!(first.token, "rt");
    assert_eq!(first.secret, "rts");
    assert_eq!(second.token, "rt");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "second call must reuse the cache");

    let header = authorization_of(&requests[0]);
    assert!(header.starts_with("OAuth "));
    assert!(header.contains("oauth_consumer_key=\"consumer_key\""));
    assert!(header.contains("oauth_signature=\""));
    assert!(header.contains("oauth_callback=\"https%3A%2F%2Fapp.example.com%2Fcallback\""));
}

#[tokio::test]
async fn test_authorize_url_embeds_request_token() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;

    let mut client = client_for(&server);
    let url = client.authorize_url().await.expect("authorize url");

    assert_eq!(
        url,
        format!("{}/oauth/authorize?oauth_token=rt", server.uri())
    );
}

#[tokio::test]
async fn test_logout_clears_cached_request_token() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;

    let mut client = client_for(&server);
    client.request_token().await.unwrap();
    client.logout();
    client.request_token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2, "logout must force a re-fetch");
}

#[tokio::test]
async fn test_login_verified_user_installs_access_token() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("oauth_token=at&oauth_token_secret=ats"),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login_verified_user("verifier123").await.expect("login succeeds");

    assert!(client.logged_in());
    let attrs = client.access_token_attributes().unwrap();
    assert_eq!(attrs.oauth_token, "at");
    assert_eq!(attrs.oauth_token_secret, "ats");

    let requests = server.received_requests().await.unwrap();
    let exchange = requests
        .iter()
        .find(|request| request.url.path() == "/oauth/access_token")
        .expect("access token exchange happened");
    let header = authorization_of(exchange);
    assert!(header.contains("oauth_verifier=\"verifier123\""));
    assert!(header.contains("oauth_token=\"rt\""));
}

#[tokio::test]
async fn test_login_as_owner_success() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/login_as_owner.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": { "oauth_token": "x", "oauth_token_secret": "y" }
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login_as_owner().await.expect("owner login succeeds");

    assert!(client.logged_in());
    let attrs = client.access_token_attributes().unwrap();
    assert_eq!(attrs.oauth_token, "x");
    assert_eq!(attrs.oauth_token_secret, "y");

    let requests = server.received_requests().await.unwrap();
    let login = requests
        .iter()
        .find(|request| request.url.path() == "/api/v1/users/login_as_owner.json")
        .expect("owner login happened");
    let body = String::from_utf8(login.body.clone()).unwrap();
    assert!(body.contains("request_token=rt"), "unexpected body: {body}");
}

#[tokio::test]
async fn test_login_as_owner_denied() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/login_as_owner.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "denied" })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.login_as_owner().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Could not get Access Token"));
    assert!(err.to_string().contains("denied"));
    assert!(!client.logged_in());
}

#[tokio::test]
async fn test_login_as_posts_bracketed_email() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/login_as.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": { "oauth_token": "u", "oauth_token_secret": "v" }
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.login_as("alice@example.com").await.expect("login succeeds");

    assert!(client.logged_in());
    assert_eq!(client.access_token_attributes().unwrap().oauth_token, "u");

    let requests = server.received_requests().await.unwrap();
    let login = requests
        .iter()
        .find(|request| request.url.path() == "/api/v1/users/login_as.json")
        .expect("login happened");
    let body = String::from_utf8(login.body.clone()).unwrap();
    assert!(
        body.contains("user%5Bemail%5D=alice%40example.com"),
        "unexpected body: {body}"
    );
    assert!(body.contains("request_token=rt"), "unexpected body: {body}");
}

#[tokio::test]
async fn test_login_as_invalid_email_makes_no_http_call() {
    let server = MockServer::start().await;

    let mut client = client_for(&server);
    let err = client.login_as("bad-email").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("'bad-email' is not a valid email address"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_as_replaces_previous_session() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/users/login_as.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": { "oauth_token": "new", "oauth_token_secret": "secret" }
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_access_token_attributes(uservoice::AccessTokenAttributes {
        oauth_token: "old".to_string(),
        oauth_token_secret: "old_secret".to_string(),
    });

    client.login_as("alice@example.com").await.unwrap();

    assert_eq!(client.access_token_attributes().unwrap().oauth_token, "new");
}

#[tokio::test]
async fn test_malformed_token_response_surfaces_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("error=nope"))
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.request_token().await.unwrap_err();

    assert!(matches!(err, Error::TokenResponse(_)));
}
