//! Layered credential lookup: rc file first, terminal prompts last.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{FileSource, PromptInput};
use crate::rcfile;

/// Resolves credentials from an rc file, falling back to prompting.
pub struct CredentialResolver<'a> {
    files: &'a dyn FileSource,
    prompt: &'a dyn PromptInput,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(files: &'a dyn FileSource, prompt: &'a dyn PromptInput) -> Self {
        Self { files, prompt }
    }

    /// Produce a username/password pair.
    ///
    /// Values found in the rc file win; prompts are issued only for
    /// fields still unset, and only when `interactive` is set. With
    /// `interactive` off, unset fields come back as `None`. A missing
    /// rc file is an empty credential source, not an error.
    pub fn resolve_credentials(
        &self,
        rc_path: Option<&Path>,
        prefix: &str,
        interactive: bool,
    ) -> Result<(Option<String>, Option<String>)> {
        let (mut username, mut password) = match self.read_rc(rc_path)? {
            Some(contents) => rcfile::scan_credentials(&contents, prefix),
            None => (None, None),
        };
        debug!(
            username_from_file = username.is_some(),
            password_from_file = password.is_some(),
            "rc file scan complete"
        );

        if interactive {
            if username.is_none() {
                username = Some(self.prompt.read_line("user: ").map_err(Error::Prompt)?);
            }
            if password.is_none() {
                password = Some(
                    self.prompt
                        .read_password("password: ")
                        .map_err(Error::Prompt)?,
                );
            }
        }
        Ok((username, password))
    }

    /// Look up a token in the rc file.
    ///
    /// There is no interactive fallback for tokens; absence is absence.
    pub fn resolve_token(&self, rc_path: Option<&Path>, prefix: &str) -> Result<Option<String>> {
        Ok(self
            .read_rc(rc_path)?
            .and_then(|contents| rcfile::scan_token(&contents, prefix)))
    }

    /// Read the effective rc file: the caller's path, else `~/.fogbugzrc`.
    /// `Ok(None)` when the file (or the home directory) does not exist.
    fn read_rc(&self, rc_path: Option<&Path>) -> Result<Option<String>> {
        let path: PathBuf = match rc_path {
            Some(path) => path.to_path_buf(),
            None => match rcfile::default_rc_path() {
                Some(path) => path,
                None => return Ok(None),
            },
        };
        self.files
            .read(&path)
            .map_err(|source| Error::RcRead { path, source })
    }
}
