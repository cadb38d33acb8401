// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UserVoice API client.
//!
//! Handles:
//! - OAuth request/access token lifecycle
//! - Privileged logins (`login_as`, `login_as_owner`)
//! - Signed HTTP verb dispatch against the subdomain API

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::oauth::{self, AccessToken, AccessTokenAttributes, Consumer, RequestToken};
use crate::params;
use crate::sso::validate_email;

/// Client for one subdomain's API.
///
/// A client is either "logged out" (no access token) or "logged in";
/// transitions are explicit. Requests are signed with the access token
/// when present, and with the consumer credentials alone otherwise.
pub struct Client {
    consumer: Consumer,
    http: reqwest::Client,
    subdomain: String,
    callback: Option<String>,
    request_token: Option<RequestToken>,
    access_token: Option<AccessToken>,
}

impl Client {
    /// Create a client for `{protocol}://{subdomain}.{domain}`.
    ///
    /// If `config.access_token` is given it is installed immediately and
    /// the client starts out logged in.
    pub fn new(
        subdomain: &str,
        api_key: &str,
        api_secret: &str,
        config: ClientConfig,
    ) -> Result<Self> {
        let site = config.site_url(subdomain);

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let mut client = Self {
            consumer: Consumer {
                key: api_key.to_string(),
                secret: api_secret.to_string(),
                site,
            },
            http,
            subdomain: subdomain.to_string(),
            callback: config.callback,
            request_token: None,
            access_token: None,
        };
        if let Some(attrs) = config.access_token {
            client.set_access_token_attributes(attrs);
        }
        Ok(client)
    }

    // ─── Token Lifecycle ─────────────────────────────────────────────────

    /// Obtain an OAuth request token, reusing the cached one when present.
    pub async fn request_token(&mut self) -> Result<RequestToken> {
        if let Some(token) = &self.request_token {
            return Ok(token.clone());
        }

        let url = format!("{}/oauth/request_token", self.consumer.site);
        let mut extra: Vec<(&str, &str)> = Vec::new();
        if let Some(callback) = &self.callback {
            extra.push(("oauth_callback", callback.as_str()));
        }
        let header = self
            .consumer
            .authorization_header("POST", &url, &[], None, &extra);

        tracing::debug!(subdomain = %self.subdomain, "fetching OAuth request token");
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, header)
            .send()
            .await?;
        let body = response.text().await?;
        let (token, secret) = oauth::parse_token_response(&body)?;

        let fetched = RequestToken { token, secret };
        self.request_token = Some(fetched.clone());
        Ok(fetched)
    }

    /// URL to send the user to for authorizing the request token
    /// (fetches one first if none is cached).
    pub async fn authorize_url(&mut self) -> Result<String> {
        let token = self.request_token().await?;
        Ok(format!(
            "{}/oauth/authorize?oauth_token={}",
            self.consumer.site,
            oauth::percent_encode(&token.token)
        ))
    }

    /// Install an access token from persisted attributes.
    pub fn set_access_token_attributes(&mut self, attrs: AccessTokenAttributes) {
        self.access_token = Some(attrs.into());
    }

    /// Export the current access token, if any, in persistable form.
    pub fn access_token_attributes(&self) -> Option<AccessTokenAttributes> {
        self.access_token.as_ref().map(AccessTokenAttributes::from)
    }

    /// Exchange the authorized request token plus verifier for an access
    /// token and install it.
    pub async fn login_verified_user(&mut self, verifier: &str) -> Result<()> {
        let request_token = self.request_token().await?;

        let url = format!("{}/oauth/access_token", self.consumer.site);
        let header = self.consumer.authorization_header(
            "POST",
            &url,
            &[],
            Some((request_token.token.as_str(), request_token.secret.as_str())),
            &[("oauth_verifier", verifier)],
        );

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, header)
            .send()
            .await?;
        let body = response.text().await?;
        let (token, secret) = oauth::parse_token_response(&body)?;

        self.access_token = Some(AccessToken { token, secret });
        tracing::info!(subdomain = %self.subdomain, "verified user logged in");
        Ok(())
    }

    /// Clear both the cached request token and the access token.
    pub fn logout(&mut self) {
        self.request_token = None;
        self.access_token = None;
    }

    /// Log in as the account owner using only the API credentials.
    pub async fn login_as_owner(&mut self) -> Result<()> {
        self.logout();
        let request_token = self.request_token().await?;

        let params = serde_json::json!({ "request_token": request_token.token });
        let response = self
            .post("/api/v1/users/login_as_owner.json", &params)
            .await?;
        self.install_login_response(response).await?;

        tracing::info!(subdomain = %self.subdomain, "logged in as account owner");
        Ok(())
    }

    /// Log in as an arbitrary user identified by email address.
    ///
    /// The email is validated before any network I/O happens.
    pub async fn login_as(&mut self, email: &str) -> Result<()> {
        validate_email(email)?;
        self.logout();
        let request_token = self.request_token().await?;

        let params = serde_json::json!({
            "user": { "email": email },
            "request_token": request_token.token,
        });
        let response = self.post("/api/v1/users/login_as.json", &params).await?;
        self.install_login_response(response).await?;

        tracing::info!(subdomain = %self.subdomain, "logged in as user");
        Ok(())
    }

    /// Whether an access token is currently installed.
    pub fn logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Install the access token carried in a privileged-login response,
    /// or fail with the raw response when none is present.
    async fn install_login_response(&mut self, response: Response) -> Result<()> {
        let body: Value = serde_json::from_str(&response.text().await?)?;
        match body.get("token") {
            Some(token) => {
                let attrs: AccessTokenAttributes = serde_json::from_value(token.clone())?;
                self.set_access_token_attributes(attrs);
                Ok(())
            }
            None => Err(Error::Unauthorized(format!(
                "Could not get Access Token: {body}"
            ))),
        }
    }

    // ─── Request Dispatch ────────────────────────────────────────────────

    /// Issue a signed request against the subdomain API and return the
    /// raw response.
    ///
    /// `params` is flattened per [`params::flatten`] and travels as the
    /// query string for GET/DELETE and as a form body for POST/PUT. A
    /// query string already embedded in `path` participates in signing
    /// as well.
    pub async fn request(&self, method: Method, path: &str, params: &Value) -> Result<Response> {
        let (bare_path, mut pairs) = split_query(path);
        pairs.extend(params::flatten(params));

        let url = format!("{}{}", self.consumer.site, bare_path);
        let token = self
            .access_token
            .as_ref()
            .map(|token| (token.token.as_str(), token.secret.as_str()));
        let header = self
            .consumer
            .authorization_header(method.as_str(), &url, &pairs, token, &[]);

        let builder = if method == Method::POST || method == Method::PUT {
            self.http.request(method.clone(), &url).form(&pairs)
        } else {
            self.http.request(method.clone(), &url).query(&pairs)
        };

        tracing::debug!(method = %method, url = %url, "dispatching API request");
        let response = builder.header(AUTHORIZATION, header).send().await?;
        tracing::debug!(status = %response.status(), url = %url, "API response received");
        Ok(response)
    }

    /// GET convenience wrapper over [`request`](Self::request).
    pub async fn get(&self, path: &str, params: &Value) -> Result<Response> {
        self.request(Method::GET, path, params).await
    }

    /// POST convenience wrapper over [`request`](Self::request).
    pub async fn post(&self, path: &str, params: &Value) -> Result<Response> {
        self.request(Method::POST, path, params).await
    }

    /// PUT convenience wrapper over [`request`](Self::request).
    pub async fn put(&self, path: &str, params: &Value) -> Result<Response> {
        self.request(Method::PUT, path, params).await
    }

    /// DELETE convenience wrapper over [`request`](Self::request).
    pub async fn delete(&self, path: &str, params: &Value) -> Result<Response> {
        self.request(Method::DELETE, path, params).await
    }
}

/// Split a path with an optional embedded query string into the bare path
/// and decoded key/value pairs.
fn split_query(path: &str) -> (&str, Vec<(String, String)>) {
    let Some((bare, query)) = path.split_once('?') else {
        return (path, Vec::new());
    };

    let mut pairs = Vec::new();
    for piece in query.split('&').filter(|piece| !piece.is_empty()) {
        let (key, value) = piece.split_once('=').unwrap_or((piece, ""));
        pairs.push((decode_component(key), decode_component(value)));
    }
    (bare, pairs)
}

fn decode_component(component: &str) -> String {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| component.to_string())
}
