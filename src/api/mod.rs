//! Network-facing checks against the ticket tracker's logon API.
//!
//! The tracker exposes a logon endpoint that echoes a still-valid
//! session token back in the response body; [`check_token`] drives
//! that endpoint through an injected [`HttpGet`](crate::io::HttpGet).

pub mod validate;

pub use validate::{check_token, validate_token, TokenCheck};
