// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SSO token generation.
//!
//! Builds the encrypted, URL-safe token the hosted service decrypts to
//! sign a user in without a password exchange. The key derivation and
//! cipher parameters here mirror the service's token decoder exactly and
//! must not be changed.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use sha1::Sha1;

use crate::error::{Error, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// Default validity window for generated tokens.
const DEFAULT_VALIDITY_SECS: i64 = 5 * 60;

/// PBKDF2 iteration count expected by the service's token decoder.
const KDF_ITERATIONS: u32 = 2048;

/// Accepted email format: word-char start, standard local-part specials,
/// one or more dot-joined labels, 2-9 letter TLD.
static EMAIL_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][-+.A-Za-z0-9_!#$%&'*/=?^`{|}~]*@([-A-Za-z0-9_]*\.)+[A-Za-z]{2,9}$")
        .expect("email pattern compiles")
});

/// Validate an email address against the service's accepted format.
pub(crate) fn validate_email(email: &str) -> Result<()> {
    if EMAIL_FORMAT.is_match(email) {
        Ok(())
    } else {
        Err(Error::Unauthorized(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// Generate an SSO token with the default five-minute validity window.
///
/// `user` must carry an `email` attribute; any further attributes
/// (name, id, custom fields) are passed through to the service verbatim.
pub fn generate_sso_token(
    subdomain_key: &str,
    sso_key: &str,
    user: Map<String, Value>,
) -> Result<String> {
    generate_sso_token_with_validity(
        subdomain_key,
        sso_key,
        user,
        Some(Duration::seconds(DEFAULT_VALIDITY_SECS)),
    )
}

/// Generate an SSO token, controlling the validity window explicitly.
///
/// When `valid_for` is `Some` and the map has no `expires` attribute, one
/// is added at current UTC time plus the window. An existing `expires`
/// value is never overwritten, and `valid_for = None` adds no `expires`
/// key at all.
pub fn generate_sso_token_with_validity(
    subdomain_key: &str,
    sso_key: &str,
    mut user: Map<String, Value>,
    valid_for: Option<Duration>,
) -> Result<String> {
    if let Some(window) = valid_for {
        if !user.contains_key("expires") {
            let expires = (Utc::now() + window)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string();
            user.insert("expires".to_string(), Value::String(expires));
        }
    }

    let email = match user.get("email") {
        Some(Value::String(email)) => email.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    validate_email(&email)?;

    if sso_key.len() <= 1 {
        return Err(Error::Unauthorized("Please specify your SSO key".to_string()));
    }

    let key = derive_key(subdomain_key, sso_key);
    let plaintext = serde_json::to_vec(&Value::Object(user))?;
    let encrypted = encrypt(&key, &plaintext);

    let encoded = BASE64.encode(encrypted);
    Ok(urlencoding::encode(&encoded).into_owned())
}

/// Derive the cipher key from the account key as password and the SSO key
/// as salt: PBKDF2-HMAC-SHA1, 2048 iterations, 16-byte output.
fn derive_key(password: &str, salt: &str) -> [u8; 16] {
    let mut key = [0u8; 16];
    pbkdf2::pbkdf2_hmac::<Sha1>(
        password.as_bytes(),
        salt.as_bytes(),
        KDF_ITERATIONS,
        &mut key,
    );
    key
}

/// AES-128-CBC with PKCS#7 padding and an all-zero IV.
///
/// The receiving decoder reconstructs plaintext from key material alone,
/// so output is fully deterministic for equal inputs.
fn encrypt(key: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    let iv = [0u8; 16];
    Aes128CbcEnc::new(key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}
