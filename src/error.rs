use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A token was supplied together with a username or password.
    #[error("if you supply 'token' you cannot supply 'username' or 'password'")]
    ConflictingCredentials,

    /// Exactly one of username/password was supplied.
    #[error("you must supply both 'username' and 'password'")]
    IncompleteCredentials,

    /// Resolution produced a password without a username.
    #[error("you must provide either 'username' and 'password' or 'token'")]
    MissingCredentials,

    /// The rc file exists but could not be read.
    #[error("failed to read rc file {}", .path.display())]
    RcRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A terminal prompt failed.
    #[error("terminal prompt failed")]
    Prompt(#[source] io::Error),

    /// The caller-supplied client constructor, logon, or logoff failed.
    #[error("client error: {0}")]
    Client(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
