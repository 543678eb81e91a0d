//! Scoped sessions: acquire a client, run a block, always release.

use tracing::warn;

use crate::auth::orchestrator::{AuthOptions, AuthenticatedClient, Authenticator, FogBugzClient};
use crate::error::{Error, Result};

impl<'a> Authenticator<'a> {
    /// Acquire a client, hand it to `work`, and run the release action
    /// on every exit path out of `work`.
    ///
    /// With `logoff` set the release action calls the client's
    /// `logoff`; otherwise it prints a one-line notice with the session
    /// token so it can be reused later (the default). Errors raised by
    /// `work` propagate unchanged; a logoff failure is surfaced only
    /// when `work` itself succeeded.
    pub fn scoped_session<C, F, W, T>(
        &self,
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
        let mut client = self.authenticate(construct, host, opts)?;

        let outcome = work(&mut client).map_err(Error::Client);
        let released = release(&mut client, logoff);

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(work_err), Ok(())) => Err(work_err),
            (Err(work_err), Err(release_err)) => {
                warn!(error = %release_err, "logoff failed after session error");
                Err(work_err)
            }
        }
    }
}

fn release<C: FogBugzClient>(client: &mut AuthenticatedClient<C>, logoff: bool) -> Result<()> {
    if logoff {
        client.get_mut().logoff().map_err(Error::Client)
    } else {
        let token = client
            .get_ref()
            .current_token()
            .or_else(|| client.session_token().map(str::to_string))
            .unwrap_or_default();
        println!("Save this token for later: token={token}");
        Ok(())
    }
}
