//! Credential resolution and logon helper for FogBugz-style ticket
//! trackers.
//!
//! Authentication material (a session token, or a username/password
//! pair) is resolved from three sources in priority order: explicit
//! caller arguments, a local `~/.fogbugzrc` file, and interactive
//! terminal prompts. The resolved material is then used to construct
//! (and, for password logons, log on) a caller-supplied client.
//!
//! The crate never implements the tracker client itself; callers hand
//! in a constructor closure and a type implementing [`FogBugzClient`].
//!
//! ```no_run
//! use fogbugz_credentials::{authenticate, AuthOptions, FogBugzClient};
//!
//! struct Tracker;
//!
//! impl FogBugzClient for Tracker {
//!     fn logon(&mut self, _username: &str, _password: &str) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn logoff(&mut self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> fogbugz_credentials::Result<()> {
//! let client = authenticate(
//!     |_host, _token| Ok(Tracker),
//!     "https://bugs.example.com",
//!     AuthOptions::new().prefix("example."),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! All terminal, filesystem, and network access goes through the seams
//! in [`io`], so tests (and embedders with unusual environments) can
//! inject their own implementations via [`CredentialResolver`] and
//! [`Authenticator`].

pub mod api;
pub mod auth;
pub mod error;
pub mod io;
pub mod rcfile;

use std::path::Path;

pub use api::{check_token, validate_token, TokenCheck};
pub use auth::{
    AuthOptions, AuthenticatedClient, Authenticator, CredentialResolver, FogBugzClient,
};
pub use error::{Error, Result};
pub use io::{
    DiskFileSource, FileSource, HttpFetcher, HttpGet, PromptInput, TerminalPrompt,
};
pub use rcfile::default_rc_path;

/// Resolve a username/password pair using the real terminal and
/// filesystem. See [`CredentialResolver::resolve_credentials`].
pub fn resolve_credentials(
    rc_path: Option<&Path>,
    prefix: &str,
    interactive: bool,
) -> Result<(Option<String>, Option<String>)> {
    CredentialResolver::new(&DiskFileSource, &TerminalPrompt)
        .resolve_credentials(rc_path, prefix, interactive)
}

/// Look up a token in the rc file. See
/// [`CredentialResolver::resolve_token`].
pub fn resolve_token(rc_path: Option<&Path>, prefix: &str) -> Result<Option<String>> {
    CredentialResolver::new(&DiskFileSource, &TerminalPrompt).resolve_token(rc_path, prefix)
}

/// Resolve credentials and construct a ready client using the real
/// terminal, filesystem, and network. See
/// [`Authenticator::authenticate`].
pub fn authenticate<C, F>(construct: F, host: &str, opts: AuthOptions) -> Result<AuthenticatedClient<C>>
where
    C: FogBugzClient,
    F: FnOnce(&str, Option<&str>) -> anyhow::Result<C>,
{
    let http = HttpFetcher::new().map_err(Error::Client)?;
    Authenticator::new(&DiskFileSource, &TerminalPrompt, &http).authenticate(construct, host, opts)
}

/// Run `work` inside a session with a guaranteed release action. See
/// [`Authenticator::scoped_session`].
pub fn scoped_session<C, F, W, T>(
    construct: F,
    host: &str,
    logoff: bool,
    opts: AuthOptions,
    work: W,
) -> Result<T>
where
    C: FogBugzClient,
    F: FnOnce(&str, Option<&str>) -> anyhow::Result<C>,
    W: FnOnce(&mut AuthenticatedClient<C>) -> anyhow::Result<T>,
{
    let http = HttpFetcher::new().map_err(Error::Client)?;
    Authenticator::new(&DiskFileSource, &TerminalPrompt, &http)
        .scoped_session(construct, host, logoff, opts, work)
}
