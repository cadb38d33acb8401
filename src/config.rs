//! Client configuration with documented defaults.
//!
//! All configuration is passed at construction; there is no environment or
//! file loading in this layer.

use std::fmt;
use std::time::Duration;

use crate::oauth::AccessTokenAttributes;

/// URL scheme used for the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options accepted by [`Client::new`](crate::Client::new).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Redirect URL passed as `oauth_callback` when fetching a request token.
    pub callback: Option<String>,
    /// URL scheme for the API base URL.
    pub protocol: Protocol,
    /// Service domain the subdomain is appended to.
    pub uservoice_domain: String,
    /// Pre-existing access token to install at construction.
    pub access_token: Option<AccessTokenAttributes>,
    /// Timeout applied to every HTTP request. `None` leaves the transport
    /// default (no timeout).
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            callback: None,
            protocol: Protocol::Https,
            uservoice_domain: "uservoice.com".to_string(),
            access_token: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Base site URL for the given subdomain.
    pub fn site_url(&self, subdomain: &str) -> String {
        format!("{}://{}.{}", self.protocol, subdomain, self.uservoice_domain)
    }
}
