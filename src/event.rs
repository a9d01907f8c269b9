use crate::player::{self, PlaybackClient, PlayerError, Session};
use crate::settings::Settings;
use crate::state::{Action, Outcome, SessionState};
use crate::tag::TagReading;

/// Feed one reading through the tracker and carry out whatever it asks of
/// the daemon. Daemon failures are logged here and never propagate.
pub fn handle_tick<C: PlaybackClient>(
    state: &mut SessionState,
    reading: &TagReading,
    client: &mut C,
    settings: &Settings,
) {
    let action = state.observe(reading, settings.absence_threshold);
    if reading.id.is_none() && state.consecutive_absences > 1 {
        // The reader reports no tag on every other poll, so a single miss is noise.
        tracing::debug!(
            absences = state.consecutive_absences,
            "Seen no tag several times in a row"
        );
    }

    let result = match &action {
        Action::Idle => return,
        Action::Pause => {
            tracing::debug!(
                absences = state.consecutive_absences,
                "Tag gone too long, pausing playback"
            );
            run(client, settings, |s| s.pause())
        }
        Action::Load { tag, playlist } => {
            tracing::debug!(tag = %tag, playlist = %playlist, "New tag detected");
            run(client, settings, |s| {
                player::load_and_play(s, playlist, settings.load_mode, &settings.shuffle_suffix)
            })
        }
        Action::Resume => run(client, settings, |s| s.play()),
    };

    let outcome = match result {
        Ok(()) => {
            log_success(&action);
            Outcome::Completed
        }
        Err(e) if e.is_session_failure() => {
            tracing::warn!(error = %e, "Playback daemon unreachable, retrying next tick");
            Outcome::Unreachable
        }
        Err(e) => {
            log_command_failure(&action, state, &e);
            Outcome::CommandFailed
        }
    };
    state.apply(action, outcome);
}

fn run<C, F>(client: &mut C, settings: &Settings, f: F) -> Result<(), PlayerError>
where
    C: PlaybackClient,
    F: FnOnce(&mut C::Session) -> Result<(), PlayerError>,
{
    player::with_session(client, settings.credential.as_ref(), f)
}

fn log_success(action: &Action) {
    match action {
        Action::Load { playlist, .. } => tracing::info!(playlist = %playlist, "Loaded playlist"),
        Action::Resume => tracing::info!("Resumed playback"),
        Action::Pause => tracing::info!("Paused playback"),
        Action::Idle => {}
    }
}

fn log_command_failure(action: &Action, state: &SessionState, err: &PlayerError) {
    match action {
        Action::Load { playlist, .. } => {
            tracing::info!(playlist = %playlist, error = %err, "Error loading playlist")
        }
        Action::Resume => tracing::info!(
            playlist = %state.playlist_label(),
            error = %err,
            "Error resuming playback"
        ),
        Action::Pause => tracing::info!(error = %err, "Error pausing playback"),
        Action::Idle => {}
    }
}
