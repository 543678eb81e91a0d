//! Credential resolution and the authentication decision tree.
//!
//! This module provides:
//! - `CredentialResolver`: layered rc-file lookup with interactive
//!   prompting as the last resort
//! - `Authenticator`: picks between token and username/password logon
//!   and constructs the caller's client
//! - scoped sessions with a guaranteed release action

pub mod orchestrator;
pub mod resolver;
pub mod session;

pub use orchestrator::{AuthOptions, AuthenticatedClient, Authenticator, FogBugzClient};
pub use resolver::CredentialResolver;
