//! Runtime settings: defaults, an optional JSON file, and CLI overrides.

use crate::Config;
use crate::player::mpd::DEFAULT_ADDRESS;
use crate::player::{Credential, DEFAULT_SHUFFLE_SUFFIX, LoadMode};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ABSENCE_THRESHOLD: u32 = 3;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_TAG_SOURCE: &str = "/run/tagplay/current-tag";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything the poll loop needs, fully resolved.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mpd_address: String,
    pub tag_source: PathBuf,
    /// Consecutive absent reads tolerated before pausing.
    pub absence_threshold: u32,
    pub poll_interval: Duration,
    pub load_mode: LoadMode,
    pub shuffle_suffix: String,
    /// `None` disables the daemon I/O timeout.
    pub timeout: Option<Duration>,
    pub credential: Option<Credential>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mpd_address: DEFAULT_ADDRESS.to_string(),
            tag_source: PathBuf::from(DEFAULT_TAG_SOURCE),
            absence_threshold: DEFAULT_ABSENCE_THRESHOLD,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            load_mode: LoadMode::default(),
            shuffle_suffix: DEFAULT_SHUFFLE_SUFFIX.to_string(),
            timeout: Some(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            credential: None,
        }
    }
}

/// Optional settings file. Every key may be omitted.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub mpd: Option<String>,
    pub tag_source: Option<PathBuf>,
    pub password_file: Option<PathBuf>,
    pub absence_threshold: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub load_mode: Option<LoadMode>,
    pub shuffle_suffix: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Settings {
    /// Merge CLI values over file values over defaults, then load the
    /// password file if one is named.
    pub fn resolve(cli: &Config, file: FileSettings) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let timeout_ms = cli.timeout_ms.or(file.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
        let password_file = cli.password.clone().or(file.password_file);
        let credential = match password_file {
            Some(path) => load_password(&path)?,
            None => cli.env_credential.clone(),
        };

        Ok(Self {
            mpd_address: cli.mpd.clone().or(file.mpd).unwrap_or(defaults.mpd_address),
            tag_source: cli.tag_source.clone().or(file.tag_source).unwrap_or(defaults.tag_source),
            absence_threshold: cli
                .absence_threshold
                .or(file.absence_threshold)
                .unwrap_or(defaults.absence_threshold),
            poll_interval: cli
                .poll_interval_ms
                .or(file.poll_interval_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            load_mode: cli.load_mode.or(file.load_mode).unwrap_or(defaults.load_mode),
            shuffle_suffix: cli
                .shuffle_suffix
                .clone()
                .or(file.shuffle_suffix)
                .unwrap_or(defaults.shuffle_suffix),
            timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            credential,
        })
    }
}

/// Read a single-line daemon password. A missing or blank file means no
/// authentication; any other read failure is fatal.
pub fn load_password(path: &Path) -> Result<Option<Credential>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let secret = contents.trim();
            if secret.is_empty() {
                tracing::warn!(path = %path.display(), "Password file is empty, not authenticating");
                Ok(None)
            } else {
                Ok(Some(Credential::new(secret)))
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Password file not found, not authenticating");
            Ok(None)
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Address (and password, from the `password@host` form) described by the
/// `MPD_HOST`/`MPD_PORT` environment variables.
pub fn mpd_from_env(
    host: Option<String>,
    port: Option<String>,
) -> Option<(String, Option<Credential>)> {
    let host = host.filter(|h| !h.is_empty());
    let port = port.filter(|p| !p.is_empty());
    let (host, credential) = match host {
        Some(host) => match host.rsplit_once('@') {
            Some((secret, rest)) if !secret.is_empty() && !rest.is_empty() => {
                (Some(rest.to_string()), Some(Credential::new(secret)))
            }
            _ => (Some(host), None),
        },
        None => (None, None),
    };
    let address = match (host, port) {
        (Some(host), _) if host.contains('/') => host,
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => format!("{host}:6600"),
        (None, Some(port)) => format!("localhost:{port}"),
        (None, None) => return None,
    };
    Some((address, credential))
}
