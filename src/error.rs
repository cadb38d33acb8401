// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crate error types.

/// Errors surfaced by the SSO token generator and the API client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service refused, or would refuse, the operation: invalid email
    /// address, missing SSO key, or a privileged login that did not yield
    /// an access token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An OAuth token endpoint returned a body without a usable
    /// token/secret pair.
    #[error("OAuth token response error: {0}")]
    TokenResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures callers should treat as authorization problems,
    /// as opposed to transport or parsing failures.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
