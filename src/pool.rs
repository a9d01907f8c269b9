// pool.rs: Central poll loop driving reads and playback commands

use crate::event::handle_tick;
use crate::player::PlaybackClient;
use crate::settings::Settings;
use crate::state::SessionState;
use crate::tag::TagReader;
use std::future::Future;
use tokio::task::JoinError;

/// Owns the reader, the playback client and the session state.
pub struct Poller<R, C> {
    reader: R,
    client: C,
    state: SessionState,
    settings: Settings,
}

impl<R: TagReader, C: PlaybackClient> Poller<R, C> {
    pub fn new(reader: R, client: C, settings: Settings) -> Self {
        Self {
            reader,
            client,
            state: SessionState::new(),
            settings,
        }
    }

    /// One complete tick: read, classify, talk to the daemon if needed.
    pub fn tick(&mut self) {
        let reading = self.reader.read_no_block();
        handle_tick(&mut self.state, &reading, &mut self.client, &self.settings);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

/// Run ticks until `shutdown` resolves.
///
/// Ticks never overlap: each one runs to completion on the blocking pool
/// (reader and daemon I/O are synchronous), then the loop sleeps for the poll
/// interval before starting the next.
pub async fn listen<R, C, F>(mut poller: Poller<R, C>, shutdown: F) -> Result<Poller<R, C>, JoinError>
where
    R: TagReader + Send + 'static,
    C: PlaybackClient + Send + 'static,
    F: Future<Output = ()>,
{
    let poll_interval = poller.settings.poll_interval;
    tokio::pin!(shutdown);
    loop {
        poller = tokio::task::spawn_blocking(move || {
            poller.tick();
            poller
        })
        .await?;

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutting down poll loop");
                return Ok(poller);
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
