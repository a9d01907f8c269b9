//! Recording in-memory playback client for tests.

use super::{CommandErrorKind, Credential, PlaybackClient, PlayerError, Session};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Authenticate(String),
    Clear,
    Load(String),
    Shuffle,
    Play,
    Pause,
    Disconnect,
}

#[derive(Debug, Default)]
struct Behavior {
    playlists: HashSet<String>,
    unreachable: bool,
    reject_credentials: bool,
    fail_play: bool,
}

/// Clones share the same call log and behavior, so a test can keep a handle
/// while the loop owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeClient {
    calls: Arc<Mutex<Vec<Call>>>,
    behavior: Arc<Mutex<Behavior>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlists(self, names: &[&str]) -> Self {
        self.behavior
            .lock()
            .unwrap()
            .playlists
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn unreachable(self) -> Self {
        self.set_unreachable(true);
        self
    }

    pub fn rejecting_credentials(self) -> Self {
        self.behavior.lock().unwrap().reject_credentials = true;
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.behavior.lock().unwrap().unreachable = unreachable;
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.behavior.lock().unwrap().fail_play = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

impl PlaybackClient for FakeClient {
    type Session = FakeSession;

    fn connect(&mut self) -> Result<FakeSession, PlayerError> {
        if self.behavior.lock().unwrap().unreachable {
            return Err(PlayerError::Connection {
                address: "fake".into(),
                message: "connection refused".into(),
            });
        }
        self.calls.lock().unwrap().push(Call::Connect);
        Ok(FakeSession {
            calls: Arc::clone(&self.calls),
            behavior: Arc::clone(&self.behavior),
        })
    }
}

pub struct FakeSession {
    calls: Arc<Mutex<Vec<Call>>>,
    behavior: Arc<Mutex<Behavior>>,
}

impl FakeSession {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Session for FakeSession {
    fn authenticate(&mut self, credential: &Credential) -> Result<(), PlayerError> {
        self.record(Call::Authenticate(credential.expose().to_string()));
        if self.behavior.lock().unwrap().reject_credentials {
            return Err(PlayerError::Authentication("incorrect password".into()));
        }
        Ok(())
    }

    fn clear_queue(&mut self) -> Result<(), PlayerError> {
        self.record(Call::Clear);
        Ok(())
    }

    fn load(&mut self, name: &str) -> Result<(), PlayerError> {
        self.record(Call::Load(name.to_string()));
        if self.behavior.lock().unwrap().playlists.contains(name) {
            Ok(())
        } else {
            Err(PlayerError::command(
                "load",
                CommandErrorKind::NotFound,
                format!("No such playlist: {name}"),
            ))
        }
    }

    fn enable_shuffle(&mut self) -> Result<(), PlayerError> {
        self.record(Call::Shuffle);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.record(Call::Play);
        if self.behavior.lock().unwrap().fail_play {
            return Err(PlayerError::command("play", CommandErrorKind::Other, "play failed"));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.record(Call::Pause);
        Ok(())
    }

    fn disconnect(self) {
        self.record(Call::Disconnect);
    }
}
