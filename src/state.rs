// state.rs: Debounce and playback state tracked across poll ticks

use crate::playlist;
use crate::tag::{TagId, TagReading};

/// What the current tick asks of the playback daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Idle,
    /// The tag has been gone long enough; pause playback.
    Pause,
    /// A tag other than the active one appeared.
    Load { tag: TagId, playlist: String },
    /// The active tag came back after a pause.
    Resume,
}

/// How the daemon interaction for an [`Action`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// A session was open but one of its commands failed.
    CommandFailed,
    /// No session could be established, nothing was sent.
    Unreachable,
}

/// Holds the active tag, the absence counter and the believed playback state.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionState {
    pub last_seen_tag: Option<TagId>,
    pub consecutive_absences: u32,
    pub playing: bool,
    /// Playlist selected by the active tag, kept for log context.
    pub active_playlist: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a reading and update the counters it affects directly.
    ///
    /// The pause fires on the `absence_threshold + 1`th consecutive absent
    /// read, and only while playing.
    pub fn observe(&mut self, reading: &TagReading, absence_threshold: u32) -> Action {
        let Some(id) = reading.id else {
            self.consecutive_absences = self.consecutive_absences.saturating_add(1);
            if self.consecutive_absences > absence_threshold && self.playing {
                return Action::Pause;
            }
            return Action::Idle;
        };

        self.consecutive_absences = 0;
        if self.last_seen_tag != Some(id) {
            Action::Load {
                tag: id,
                playlist: playlist::resolve(id, reading),
            }
        } else if !self.playing {
            Action::Resume
        } else {
            Action::Idle
        }
    }

    /// Record the result of carrying out `action`.
    pub fn apply(&mut self, action: Action, outcome: Outcome) {
        if outcome == Outcome::Unreachable {
            // Nothing reached the daemon; the next tick decides again.
            return;
        }
        match action {
            Action::Idle => {}
            Action::Pause => self.playing = false,
            Action::Load { tag, playlist } => {
                // A failed load still claims the tag so it is not reloaded on
                // every tick while it rests on the reader.
                self.last_seen_tag = Some(tag);
                self.active_playlist = Some(playlist);
                if outcome == Outcome::Completed {
                    self.playing = true;
                }
            }
            Action::Resume => {
                if outcome == Outcome::Completed {
                    self.playing = true;
                }
            }
        }
    }

    pub fn playlist_label(&self) -> &str {
        self.active_playlist.as_deref().unwrap_or("<none>")
    }
}
