//! Token validation against the tracker's logon endpoint.

use tracing::{debug, warn};

use crate::io::{HttpFetcher, HttpGet};

/// Outcome of a token validation check.
///
/// Transport failures are reported as `Indeterminate` rather than being
/// conflated with a rejected token. Callers that want the lenient
/// collapse to a boolean can use [`TokenCheck::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// The service echoed the token back: the session is live.
    Valid,
    /// The service answered but did not recognize the token.
    Invalid,
    /// The check could not complete (network or protocol failure).
    Indeterminate,
}

impl TokenCheck {
    pub fn is_valid(self) -> bool {
        matches!(self, TokenCheck::Valid)
    }
}

/// Check a token against `{host}/api.asp?cmd=logon&token={token}`.
///
/// Success means the literal token string appears anywhere in the
/// response body; no structured parsing is attempted.
pub fn check_token(http: &dyn HttpGet, host: &str, token: &str) -> TokenCheck {
    let url = format!("{host}/api.asp?cmd=logon&token={token}");
    match http.get(&url) {
        Ok(body) if body.contains(token) => TokenCheck::Valid,
        Ok(_) => {
            debug!(host, "token rejected by logon endpoint");
            TokenCheck::Invalid
        }
        Err(e) => {
            warn!(host, error = %e, "token validation request failed");
            TokenCheck::Indeterminate
        }
    }
}

/// Validate a token using the default HTTP client.
///
/// Collapses [`TokenCheck::Indeterminate`] to `false`: with this entry
/// point a transport failure is indistinguishable from a rejected
/// token. Use [`check_token`] with an injected [`HttpGet`] to keep the
/// distinction.
pub fn validate_token(host: &str, token: &str) -> bool {
    match HttpFetcher::new() {
        Ok(http) => check_token(&http, host, token).is_valid(),
        Err(e) => {
            warn!(error = %e, "could not build HTTP client for token validation");
            false
        }
    }
}
