//! Location and scanning of the `.fogbugzrc` credentials file.
//!
//! The format is newline-delimited `prefix+key = value` entries, with
//! `#` introducing trailing comments:
//!
//! ```text
//! server1.username = alice    # comments allowed
//! server1.password = hunter2
//! server1.token = a1b2c3
//! ```
//!
//! The prefix lets one rc file hold credentials for several servers.
//! Matching is substring-based: a line is only considered for a key if
//! it literally contains `prefix+key`, and the value is then captured
//! with `key\s*=\s*(\S+)`. Later lines override earlier ones.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

/// rc file name looked up in the home directory when no path is given.
pub const RC_FILE_NAME: &str = ".fogbugzrc";

/// Default rc file location: `~/.fogbugzrc`.
/// `None` when the home directory cannot be determined.
pub fn default_rc_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(RC_FILE_NAME))
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static PASSWORD_RE: OnceLock<Regex> = OnceLock::new();
static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn username_re() -> &'static Regex {
    USERNAME_RE.get_or_init(|| Regex::new(r"username\s*=\s*(\S+)").expect("hardcoded regex"))
}

fn password_re() -> &'static Regex {
    PASSWORD_RE.get_or_init(|| Regex::new(r"password\s*=\s*(\S+)").expect("hardcoded regex"))
}

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"token\s*=\s*(\S+)").expect("hardcoded regex"))
}

/// Everything before the first `#` on a line.
fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("")
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Scan rc contents for `prefix+username` and `prefix+password`.
///
/// The last matching line wins; there is no early exit. A line that
/// matched as a username is never also considered for a password. A
/// line containing the key substring but no `key = value` assignment
/// is skipped.
pub(crate) fn scan_credentials(contents: &str, prefix: &str) -> (Option<String>, Option<String>) {
    let username_key = format!("{prefix}username");
    let password_key = format!("{prefix}password");

    let mut username = None;
    let mut password = None;
    for line in contents.lines() {
        let line = strip_comment(line);
        if line.contains(&username_key) {
            if let Some(value) = capture(username_re(), line) {
                username = Some(value);
            }
        } else if line.contains(&password_key) {
            if let Some(value) = capture(password_re(), line) {
                password = Some(value);
            }
        }
    }
    (username, password)
}

/// Scan rc contents for `prefix+token`. Last matching line wins.
pub(crate) fn scan_token(contents: &str, prefix: &str) -> Option<String> {
    let token_key = format!("{prefix}token");

    let mut token = None;
    for line in contents.lines() {
        let line = strip_comment(line);
        if line.contains(&token_key) {
            if let Some(value) = capture(token_re(), line) {
                token = Some(value);
            }
        }
    }
    token
}
