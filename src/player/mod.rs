//! Playback daemon seam: session traits, errors and the command sequences
//! issued for each tick.

pub mod mpd;
#[cfg(test)]
pub mod testing;

use std::fmt;

/// Playlist variant naming convention that asks for shuffled playback.
pub const DEFAULT_SHUFFLE_SUFFIX: &str = "[[s]]";

/// Errors that can occur while talking to the playback daemon
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    #[error("connection to {address} failed: {message}")]
    Connection { address: String, message: String },
    #[error("authentication rejected: {0}")]
    Authentication(String),
    #[error("{command} failed: {message}")]
    Command {
        command: &'static str,
        kind: CommandErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// The named entity (usually a playlist) does not exist.
    NotFound,
    Other,
}

impl PlayerError {
    pub fn command(command: &'static str, kind: CommandErrorKind, message: impl Into<String>) -> Self {
        Self::Command {
            command,
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Command {
                kind: CommandErrorKind::NotFound,
                ..
            }
        )
    }

    /// True when the failure happened before any playback command was sent.
    pub fn is_session_failure(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Authentication(_))
    }
}

/// Daemon password. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// How a newly presented tag's playlist is queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Try the shuffle variant of the playlist first, fall back to the plain name.
    #[default]
    Shuffle,
    /// Load the plain playlist name only.
    Plain,
}

/// Opens sessions against a playback daemon.
pub trait PlaybackClient {
    type Session: Session;

    fn connect(&mut self) -> Result<Self::Session, PlayerError>;
}

/// One connected session. Every command may fail with a recoverable error.
pub trait Session {
    fn authenticate(&mut self, credential: &Credential) -> Result<(), PlayerError>;
    fn clear_queue(&mut self) -> Result<(), PlayerError>;
    fn load(&mut self, name: &str) -> Result<(), PlayerError>;
    /// Shuffle the queued tracks.
    fn enable_shuffle(&mut self) -> Result<(), PlayerError>;
    fn play(&mut self) -> Result<(), PlayerError>;
    fn pause(&mut self) -> Result<(), PlayerError>;
    fn disconnect(self);
}

/// Run `f` inside a session: connect, authenticate when a credential is set,
/// then disconnect whatever `f` returned.
pub fn with_session<C, F>(
    client: &mut C,
    credential: Option<&Credential>,
    f: F,
) -> Result<(), PlayerError>
where
    C: PlaybackClient,
    F: FnOnce(&mut C::Session) -> Result<(), PlayerError>,
{
    let mut session = client.connect()?;
    let result = match credential {
        Some(credential) => session.authenticate(credential).and_then(|()| f(&mut session)),
        None => f(&mut session),
    };
    session.disconnect();
    result
}

/// Replace the queue with `playlist` and start playing it.
pub fn load_and_play<S: Session>(
    session: &mut S,
    playlist: &str,
    mode: LoadMode,
    shuffle_suffix: &str,
) -> Result<(), PlayerError> {
    session.clear_queue()?;
    match mode {
        LoadMode::Plain => session.load(playlist)?,
        LoadMode::Shuffle => {
            let variant = format!("{playlist}{shuffle_suffix}");
            match session.load(&variant) {
                Ok(()) => session.enable_shuffle()?,
                Err(e) if e.is_not_found() => {
                    tracing::debug!(variant = %variant, "No shuffle variant, loading plain playlist");
                    session.load(playlist)?;
                }
                Err(e) => return Err(e),
            }
        }
    }
    session.play()
}
