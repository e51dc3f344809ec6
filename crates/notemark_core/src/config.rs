//! Runtime configuration sourced from environment variables.

use crate::constants::{DEFAULT_MAX_NOTE_SIZE, DEFAULT_PORT, DEFAULT_SESSION_TTL_HOURS};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration for Notemark.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_note_size: usize,
    pub session_ttl_hours: i64,
}

impl Config {
    /// Load configuration from the process environment, falling back to
    /// defaults for anything unset or unparseable.
    ///
    /// Recognized variables: `DB_PATH`, `PORT`, `MAX_NOTE_SIZE`, and
    /// `SESSION_TTL_HOURS` (which must be positive to take effect).
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| default_db_path()),
            port: parsed_env("PORT").unwrap_or(DEFAULT_PORT),
            max_note_size: parsed_env("MAX_NOTE_SIZE").unwrap_or(DEFAULT_MAX_NOTE_SIZE),
            session_ttl_hours: parsed_env("SESSION_TTL_HOURS")
                .filter(|hours| *hours > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
        }
    }
}

fn parsed_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

fn default_db_path() -> String {
    let base = home_dir().unwrap_or_else(|| PathBuf::from("."));
    [".local", "share", "notemark", "db"]
        .iter()
        .fold(base, |path, part| path.join(part))
        .to_string_lossy()
        .into_owned()
}

/// Rewrite a leading `~/` to the user's home directory.
fn expand_tilde(path: String) -> String {
    match (path.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => path,
    }
}

/// `HOME` first (Unix and some Windows shells), then `USERPROFILE`
/// (Windows), then the working directory as a last resort.
fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .find_map(|name| {
            env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
        .or_else(|| env::current_dir().ok())
}

/// Interpret a boolean-ish flag value.
///
/// Truthy spellings are `1`, `true`, `yes`, and `on`; falsy spellings are
/// the empty string, `0`, `false`, `no`, and `off`. Case and surrounding
/// whitespace are ignored. Anything else yields `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whether the environment variable `name` holds a truthy flag value.
///
/// Unset or unrecognized values count as disabled.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{env_flag_enabled, parse_env_flag, Config};
    use crate::constants::{DEFAULT_PORT, DEFAULT_SESSION_TTL_HOURS};
    use crate::env::{env_lock, EnvGuard};

    #[test]
    fn flag_spellings_parse_case_insensitively() {
        for truthy in ["1", "true", "Yes", " ON "] {
            assert_eq!(parse_env_flag(truthy), Some(true), "{truthy:?}");
        }
        for falsy in ["", "0", "False", " no ", "OFF"] {
            assert_eq!(parse_env_flag(falsy), Some(false), "{falsy:?}");
        }
        for junk in ["maybe", "2", "enabled"] {
            assert_eq!(parse_env_flag(junk), None, "{junk:?}");
        }
    }

    #[test]
    fn unset_flags_read_as_disabled() {
        let _lock = env_lock().lock().expect("env lock");
        let _unset = EnvGuard::remove("NOTEMARK_TEST_FLAG");
        assert!(!env_flag_enabled("NOTEMARK_TEST_FLAG"));
        let _set = EnvGuard::set("NOTEMARK_TEST_FLAG", "yes");
        assert!(env_flag_enabled("NOTEMARK_TEST_FLAG"));
    }

    #[test]
    fn tilde_in_db_path_expands_to_home() {
        let _lock = env_lock().lock().expect("env lock");
        let _home = EnvGuard::set("HOME", "/tmp/notemark-config-test");
        let _db = EnvGuard::set("DB_PATH", "~/store");
        assert_eq!(
            Config::from_env().db_path,
            "/tmp/notemark-config-test/store"
        );
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        let _lock = env_lock().lock().expect("env lock");
        let _port = EnvGuard::set("PORT", "not-a-port");
        assert_eq!(Config::from_env().port, DEFAULT_PORT);
    }

    #[test]
    fn zero_session_ttl_is_ignored() {
        let _lock = env_lock().lock().expect("env lock");
        let _ttl = EnvGuard::set("SESSION_TTL_HOURS", "0");
        assert_eq!(
            Config::from_env().session_ttl_hours,
            DEFAULT_SESSION_TTL_HOURS
        );
    }
}
