// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UserVoice API client and SSO token generator.
//!
//! This crate wraps the UserVoice REST API behind an OAuth 1.0a consumer
//! bound to a subdomain, and generates the encrypted single-sign-on tokens
//! the hosted service decrypts to sign users in without a password exchange.

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod params;
pub mod sso;

pub use client::Client;
pub use config::{ClientConfig, Protocol};
pub use error::{Error, Result};
pub use oauth::{AccessToken, AccessTokenAttributes, RequestToken};
pub use sso::{generate_sso_token, generate_sso_token_with_validity};
