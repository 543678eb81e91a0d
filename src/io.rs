//! Injected I/O seams for terminal, filesystem, and network access.
//!
//! The resolver and orchestrator never touch stdin, the filesystem, or
//! the network directly; they go through these traits so tests can
//! substitute fakes without mutating shared process state.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

/// HTTP request timeout in seconds for token validation.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Blocking terminal input.
pub trait PromptInput {
    /// Read one line from the terminal, displaying `prompt` first.
    fn read_line(&self, prompt: &str) -> io::Result<String>;

    /// Read one line with echo disabled, for passwords.
    fn read_password(&self, prompt: &str) -> io::Result<String>;
}

/// Production prompt: stdin for usernames, rpassword for passwords.
pub struct TerminalPrompt;

impl PromptInput for TerminalPrompt {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn read_password(&self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }
}

/// Read-only file access.
pub trait FileSource {
    /// Read a file to a string; `Ok(None)` when it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<String>>;
}

pub struct DiskFileSource;

impl FileSource for DiskFileSource {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Synchronous HTTP GET returning the response body.
pub trait HttpGet {
    fn get(&self, url: &str) -> anyhow::Result<String>;
}

/// Production GET over reqwest's blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default request timeout.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpGet for HttpFetcher {
    fn get(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send().context("request failed")?;
        response.text().context("failed to read response body")
    }
}
