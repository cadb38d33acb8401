// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Handles:
//! - Signature base string construction per RFC 5849
//! - `Authorization: OAuth` header assembly
//! - Form-encoded token endpoint response parsing

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// OAuth application identity: API key/secret and the base site URL.
#[derive(Debug, Clone)]
pub struct Consumer {
    pub key: String,
    pub secret: String,
    pub site: String,
}

/// Transient token used only to obtain authorization and exchange for an
/// access token.
#[derive(Debug, Clone)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
}

/// Authenticated session credential used to sign API calls.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
}

/// Portable access-token form for persistence and interop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenAttributes {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

impl From<AccessTokenAttributes> for AccessToken {
    fn from(attrs: AccessTokenAttributes) -> Self {
        Self {
            token: attrs.oauth_token,
            secret: attrs.oauth_token_secret,
        }
    }
}

impl From<&AccessToken> for AccessTokenAttributes {
    fn from(token: &AccessToken) -> Self {
        Self {
            oauth_token: token.token.clone(),
            oauth_token_secret: token.secret.clone(),
        }
    }
}

impl Consumer {
    /// Build the `Authorization: OAuth` header value for one request.
    ///
    /// `request_params` are the query/body parameters that travel with the
    /// request; `token` is the active `(token, secret)` pair, if any;
    /// `extra` carries call-specific protocol parameters
    /// (`oauth_callback`, `oauth_verifier`).
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        request_params: &[(String, String)],
        token: Option<(&str, &str)>,
        extra: &[(&str, &str)],
    ) -> String {
        self.authorization_header_with(
            method,
            url,
            request_params,
            token,
            extra,
            &nonce(),
            Utc::now().timestamp(),
        )
    }

    /// Deterministic core of [`authorization_header`](Self::authorization_header)
    /// with the nonce and timestamp pinned.
    fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        request_params: &[(String, String)],
        token: Option<(&str, &str)>,
        extra: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".to_string(), self.key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];
        for (name, value) in extra {
            oauth_params.push(((*name).to_string(), (*value).to_string()));
        }
        if let Some((token_value, _)) = token {
            oauth_params.push(("oauth_token".to_string(), token_value.to_string()));
        }

        let mut signed = oauth_params.clone();
        signed.extend(request_params.iter().cloned());
        let base = signature_base_string(method, url, &signed);

        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.secret),
            percent_encode(token.map(|(_, secret)| secret).unwrap_or(""))
        );
        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .expect("HMAC can take any key size");
        mac.update(base.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        oauth_params.push(("oauth_signature".to_string(), signature));

        let fields = oauth_params
            .iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, percent_encode(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }
}

/// Build the RFC 5849 signature base string from every signed parameter.
///
/// Parameters are percent-encoded first, then sorted bytewise by key and
/// value, so the result is stable regardless of input order.
fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Percent-encode with the RFC 3986 unreserved set (alphanumerics plus
/// `-`, `_`, `.`, `~`), as OAuth signing requires.
pub(crate) fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// 16 random bytes, hex-encoded.
fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Parse a form-encoded token endpoint response into a
/// `(token, secret)` pair.
pub(crate) fn parse_token_response(body: &str) -> Result<(String, String)> {
    let mut token = None;
    let mut secret = None;

    for pair in body.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| value.to_string());
        match key {
            "oauth_token" => token = Some(value),
            "oauth_token_secret" => secret = Some(value),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) => Ok((token, secret)),
        _ => Err(Error::TokenResponse(format!(
            "missing oauth_token fields in '{body}'"
        ))),
    }
}
