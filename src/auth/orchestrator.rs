//! The authentication decision tree.
//!
//! Given whatever credential fields the caller supplied, decide between
//! token-based and username/password logon, fill the gaps from the rc
//! file (and prompts), and construct the caller's client.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use tracing::debug;

use crate::api::check_token;
use crate::auth::resolver::CredentialResolver;
use crate::error::{Error, Result};
use crate::io::{FileSource, HttpGet, PromptInput};

/// Capability set a caller-supplied client must provide.
///
/// Construction itself is a plain closure (`FnOnce(&str, Option<&str>)
/// -> anyhow::Result<C>`) so differently-shaped client types plug in
/// without a common constructor. `logon` receives an empty password
/// when resolution left it unset.
pub trait FogBugzClient {
    fn logon(&mut self, username: &str, password: &str) -> anyhow::Result<()>;

    fn logoff(&mut self) -> anyhow::Result<()>;

    /// The client's current session token, if it tracks one.
    ///
    /// Clients that refresh their token during logon can override this
    /// so the scoped-session notice reports the live value.
    fn current_token(&self) -> Option<String> {
        None
    }
}

/// Options for [`Authenticator::authenticate`].
///
/// Defaults mirror the historical behavior: interactive prompting on,
/// credentials not retained, empty prefix, rc file at its default
/// location.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub rc_path: Option<PathBuf>,
    pub prefix: String,
    pub interactive: bool,
    pub store_credentials: bool,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            token: None,
            username: None,
            password: None,
            rc_path: None,
            prefix: String::new(),
            interactive: true,
            store_credentials: false,
        }
    }
}

impl AuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn rc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rc_path = Some(path.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Keep token/username/password readable on the returned handle.
    ///
    /// Opt-in with a sharp edge: anyone holding the handle can read or
    /// reuse the secrets, e.g. to log in to another system.
    pub fn store_credentials(mut self, store: bool) -> Self {
        self.store_credentials = store;
        self
    }
}

struct StoredCredentials {
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// A constructed client plus the credential material used to build it.
///
/// The session token is retained internally for the scoped-session
/// notice; the `token`/`username`/`password` accessors return values
/// only when the caller opted in with
/// [`AuthOptions::store_credentials`]. Derefs to the wrapped client.
pub struct AuthenticatedClient<C> {
    client: C,
    session_token: Option<String>,
    stored: Option<StoredCredentials>,
}

impl<C> std::fmt::Debug for AuthenticatedClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient").finish_non_exhaustive()
    }
}

impl<C> AuthenticatedClient<C> {
    pub fn token(&self) -> Option<&str> {
        self.stored.as_ref().and_then(|s| s.token.as_deref())
    }

    pub fn username(&self) -> Option<&str> {
        self.stored.as_ref().and_then(|s| s.username.as_deref())
    }

    pub fn password(&self) -> Option<&str> {
        self.stored.as_ref().and_then(|s| s.password.as_deref())
    }

    /// Token used to construct this session, kept regardless of
    /// `store_credentials`.
    pub(crate) fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn get_ref(&self) -> &C {
        &self.client
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C> Deref for AuthenticatedClient<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C> DerefMut for AuthenticatedClient<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

/// Drives credential resolution and client construction.
///
/// Holds the three injected seams; production callers use the
/// crate-level [`authenticate`](crate::authenticate) convenience, tests
/// inject fakes.
pub struct Authenticator<'a> {
    files: &'a dyn FileSource,
    prompt: &'a dyn PromptInput,
    http: &'a dyn HttpGet,
}

impl<'a> Authenticator<'a> {
    pub fn new(
        files: &'a dyn FileSource,
        prompt: &'a dyn PromptInput,
        http: &'a dyn HttpGet,
    ) -> Self {
        Self {
            files,
            prompt,
            http,
        }
    }

    /// Resolve credentials and construct a ready client.
    ///
    /// Decision path:
    /// 1. Reject a token combined with username/password, and a lone
    ///    username or password.
    /// 2. With no explicit username, try the token path: explicit
    ///    token, else rc-file token; a token that validates against
    ///    the logon endpoint short-circuits to construction with no
    ///    password logon.
    /// 3. Otherwise resolve username/password from the rc file and, if
    ///    `interactive`, prompts. A password without a username is
    ///    rejected; a fully absent pair is passed through and the
    ///    client is constructed with no credentials at all.
    /// 4. Construct via `construct(host, token)` (the token passes
    ///    through as supplied, even when it failed validation) and log
    ///    on when a username is present.
    pub fn authenticate<C, F>(
        &self,
        construct: F,
        host: &str,
        opts: AuthOptions,
    ) -> Result<AuthenticatedClient<C>>
    where
        C: FogBugzClient,
        F: FnOnce(&str, Option<&str>) -> anyhow::Result<C>,
    {
        let AuthOptions {
            mut token,
            mut username,
            mut password,
            rc_path,
            prefix,
            interactive,
            store_credentials,
        } = opts;

        if token.is_some() && (username.is_some() || password.is_some()) {
            return Err(Error::ConflictingCredentials);
        }
        if username.is_some() != password.is_some() {
            return Err(Error::IncompleteCredentials);
        }

        let resolver = CredentialResolver::new(self.files, self.prompt);

        if username.is_none() {
            if token.is_none() {
                token = resolver.resolve_token(rc_path.as_deref(), &prefix)?;
            }
            match token.as_deref() {
                Some(candidate) if check_token(self.http, host, candidate).is_valid() => {
                    debug!("token accepted, skipping password logon");
                    let client = construct(host, token.as_deref()).map_err(Error::Client)?;
                    return Ok(wrap(client, token, None, None, store_credentials));
                }
                _ => {
                    let (resolved_username, resolved_password) =
                        resolver.resolve_credentials(rc_path.as_deref(), &prefix, interactive)?;
                    if resolved_username.is_none() && resolved_password.is_some() {
                        return Err(Error::MissingCredentials);
                    }
                    username = resolved_username;
                    password = resolved_password;
                }
            }
        }

        let mut client = construct(host, token.as_deref()).map_err(Error::Client)?;
        if let Some(ref username) = username {
            client
                .logon(username, password.as_deref().unwrap_or(""))
                .map_err(Error::Client)?;
        }
        Ok(wrap(client, token, username, password, store_credentials))
    }
}

fn wrap<C>(
    client: C,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    store_credentials: bool,
) -> AuthenticatedClient<C> {
    let session_token = token.clone();
    let stored = store_credentials.then(|| StoredCredentials {
        token,
        username,
        password,
    });
    AuthenticatedClient {
        client,
        session_token,
        stored,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::path::Path;
    use std::rc::Rc;

    use super::*;

    pub(crate) struct NoFiles;

    impl FileSource for NoFiles {
        fn read(&self, _path: &Path) -> io::Result<Option<String>> {
            Ok(None)
        }
    }

    pub(crate) struct OneFile(pub &'static str);

    impl FileSource for OneFile {
        fn read(&self, _path: &Path) -> io::Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    pub(crate) struct ScriptedPrompt {
        pub line: &'static str,
        pub password: &'static str,
    }

    impl PromptInput for ScriptedPrompt {
        fn read_line(&self, _prompt: &str) -> io::Result<String> {
            Ok(self.line.to_string())
        }

        fn read_password(&self, _prompt: &str) -> io::Result<String> {
            Ok(self.password.to_string())
        }
    }

    pub(crate) struct NoPrompt;

    impl PromptInput for NoPrompt {
        fn read_line(&self, _prompt: &str) -> io::Result<String> {
            panic!("read_line should not be called");
        }

        fn read_password(&self, _prompt: &str) -> io::Result<String> {
            panic!("read_password should not be called");
        }
    }

    /// HTTP fake: echoes the configured body, or fails the test when
    /// the network should never be touched.
    pub(crate) enum FakeHttp {
        Body(&'static str),
        Unreachable,
    }

    impl HttpGet for FakeHttp {
        fn get(&self, _url: &str) -> anyhow::Result<String> {
            match self {
                FakeHttp::Body(body) => Ok(body.to_string()),
                FakeHttp::Unreachable => panic!("no network call expected"),
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct ClientLog {
        pub constructed_with: Vec<(String, Option<String>)>,
        pub logons: Vec<(String, String)>,
        pub logoffs: usize,
    }

    /// Recording client; the log outlives the client so tests can
    /// observe calls after the handle is consumed.
    pub(crate) struct MockClient {
        pub log: Rc<RefCell<ClientLog>>,
    }

    impl FogBugzClient for MockClient {
        fn logon(&mut self, username: &str, password: &str) -> anyhow::Result<()> {
            self.log
                .borrow_mut()
                .logons
                .push((username.to_string(), password.to_string()));
            Ok(())
        }

        fn logoff(&mut self) -> anyhow::Result<()> {
            self.log.borrow_mut().logoffs += 1;
            Ok(())
        }
    }

    pub(crate) fn factory(
        log: Rc<RefCell<ClientLog>>,
    ) -> impl FnOnce(&str, Option<&str>) -> anyhow::Result<MockClient> {
        move |host, token| {
            log.borrow_mut()
                .constructed_with
                .push((host.to_string(), token.map(str::to_string)));
            Ok(MockClient { log: log.clone() })
        }
    }

    #[test]
    fn token_with_username_or_password_is_conflicting() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Unreachable);

        for opts in [
            AuthOptions::new().token("a").username("a").password("x"),
            AuthOptions::new().token("a").password("a"),
            AuthOptions::new().token("a").username("a"),
        ] {
            let log = Rc::new(RefCell::new(ClientLog::default()));
            let err = auth
                .authenticate(factory(log), "hostname", opts)
                .unwrap_err();
            assert!(matches!(err, Error::ConflictingCredentials));
        }
    }

    #[test]
    fn lone_username_or_password_is_incomplete() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Unreachable);

        for opts in [
            AuthOptions::new().username("a"),
            AuthOptions::new().password("a"),
        ] {
            let log = Rc::new(RefCell::new(ClientLog::default()));
            let err = auth
                .authenticate(factory(log), "hostname", opts)
                .unwrap_err();
            assert!(matches!(err, Error::IncompleteCredentials));
        }
    }

    #[test]
    fn valid_token_short_circuits_past_logon() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Body("token=tok accepted"));
        let log = Rc::new(RefCell::new(ClientLog::default()));

        let handle = auth
            .authenticate(
                factory(log.clone()),
                "hostname",
                AuthOptions::new().token("tok").store_credentials(true),
            )
            .unwrap();

        let recorded = log.borrow();
        assert_eq!(
            recorded.constructed_with,
            [("hostname".to_string(), Some("tok".to_string()))]
        );
        assert!(recorded.logons.is_empty());
        assert_eq!(handle.token(), Some("tok"));
    }

    #[test]
    fn rejected_token_falls_back_to_resolved_credentials() {
        let auth = Authenticator::new(
            &OneFile("username = fileUser\npassword = filePwd\n"),
            &NoPrompt,
            &FakeHttp::Body("error 3: not logged on"),
        );
        let log = Rc::new(RefCell::new(ClientLog::default()));

        auth.authenticate(
            factory(log.clone()),
            "hostname",
            AuthOptions::new()
                .token("stale")
                .rc_path("/rc")
                .interactive(false),
        )
        .unwrap();

        let recorded = log.borrow();
        // The stale token still passes through to the constructor.
        assert_eq!(
            recorded.constructed_with,
            [("hostname".to_string(), Some("stale".to_string()))]
        );
        assert_eq!(
            recorded.logons,
            [("fileUser".to_string(), "filePwd".to_string())]
        );
    }

    #[test]
    fn no_username_nor_token_resolves_and_logs_on() {
        let auth = Authenticator::new(
            &NoFiles,
            &ScriptedPrompt {
                line: "username",
                password: "pwd",
            },
            &FakeHttp::Unreachable,
        );
        let log = Rc::new(RefCell::new(ClientLog::default()));

        let handle = auth
            .authenticate(
                factory(log.clone()),
                "hostname",
                AuthOptions::new().store_credentials(true),
            )
            .unwrap();

        let recorded = log.borrow();
        assert_eq!(recorded.constructed_with, [("hostname".to_string(), None)]);
        assert_eq!(recorded.logons, [("username".to_string(), "pwd".to_string())]);
        assert_eq!(handle.username(), Some("username"));
        assert_eq!(handle.password(), Some("pwd"));
        assert_eq!(handle.token(), None);
    }

    #[test]
    fn explicit_pair_skips_the_token_branch() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Unreachable);
        let log = Rc::new(RefCell::new(ClientLog::default()));

        auth.authenticate(
            factory(log.clone()),
            "hostname",
            AuthOptions::new().username("explicitUser").password("explicitPwd"),
        )
        .unwrap();

        let recorded = log.borrow();
        assert_eq!(
            recorded.logons,
            [("explicitUser".to_string(), "explicitPwd".to_string())]
        );
    }

    #[test]
    fn resolved_password_without_username_is_missing_credentials() {
        let auth = Authenticator::new(
            &OneFile("password = orphanPwd\n"),
            &NoPrompt,
            &FakeHttp::Unreachable,
        );
        let log = Rc::new(RefCell::new(ClientLog::default()));

        let err = auth
            .authenticate(
                factory(log),
                "hostname",
                AuthOptions::new().rc_path("/rc").interactive(false),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredentials));
    }

    #[test]
    fn fully_absent_credentials_pass_through_to_construction() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Unreachable);
        let log = Rc::new(RefCell::new(ClientLog::default()));

        auth.authenticate(
            factory(log.clone()),
            "hostname",
            AuthOptions::new().interactive(false),
        )
        .unwrap();

        let recorded = log.borrow();
        assert_eq!(recorded.constructed_with, [("hostname".to_string(), None)]);
        assert!(recorded.logons.is_empty());
    }

    #[test]
    fn rc_file_token_is_used_when_none_is_supplied() {
        let auth = Authenticator::new(
            &OneFile("token = fileToken\n"),
            &NoPrompt,
            &FakeHttp::Body("ok fileToken"),
        );
        let log = Rc::new(RefCell::new(ClientLog::default()));

        auth.authenticate(
            factory(log.clone()),
            "hostname",
            AuthOptions::new().rc_path("/rc"),
        )
        .unwrap();

        let recorded = log.borrow();
        assert_eq!(
            recorded.constructed_with,
            [("hostname".to_string(), Some("fileToken".to_string()))]
        );
        assert!(recorded.logons.is_empty());
    }

    #[test]
    fn credentials_are_hidden_unless_retention_was_requested() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Body("ok tok"));
        let log = Rc::new(RefCell::new(ClientLog::default()));

        let handle = auth
            .authenticate(factory(log), "hostname", AuthOptions::new().token("tok"))
            .unwrap();
        assert_eq!(handle.token(), None);
        assert_eq!(handle.username(), None);
        assert_eq!(handle.password(), None);
        // The session token is still tracked internally.
        assert_eq!(handle.session_token(), Some("tok"));
    }

    #[test]
    fn client_construction_failure_wraps_as_client_error() {
        let auth = Authenticator::new(&NoFiles, &NoPrompt, &FakeHttp::Unreachable);

        let err = auth
            .authenticate(
                |_host, _token| -> anyhow::Result<MockClient> {
                    Err(anyhow::anyhow!("constructor exploded"))
                },
                "hostname",
                AuthOptions::new().interactive(false),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Client(_)));
    }
}
