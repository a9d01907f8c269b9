//! MPD implementation of the playback seam.
//!
//! Every session opens a fresh connection and drops it on disconnect, so an
//! MPD restart between ticks is harmless.

use super::{CommandErrorKind, Credential, PlaybackClient, PlayerError, Session};
use mpd::error::{Error as MpdError, ErrorCode, ServerError};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "localhost:6600";

trait Stream: Read + Write + Send {}
impl<T: Read + Write + Send> Stream for T {}

/// Connects to MPD over TCP (`host:port`) or a Unix socket (any address
/// containing a `/`).
#[derive(Debug, Clone)]
pub struct MpdClient {
    address: String,
    timeout: Option<Duration>,
}

impl MpdClient {
    /// `timeout` bounds connecting and every read/write; `None` waits forever.
    pub fn new(address: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    fn open_stream(&self) -> io::Result<Box<dyn Stream>> {
        if self.address.contains('/') {
            return self.open_unix();
        }
        let stream = match self.timeout {
            None => TcpStream::connect(&self.address)?,
            Some(timeout) => connect_tcp_with_timeout(&self.address, timeout)?,
        };
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        Ok(Box::new(stream))
    }

    #[cfg(unix)]
    fn open_unix(&self) -> io::Result<Box<dyn Stream>> {
        let stream = std::os::unix::net::UnixStream::connect(&self.address)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        Ok(Box::new(stream))
    }

    #[cfg(not(unix))]
    fn open_unix(&self) -> io::Result<Box<dyn Stream>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Unix sockets are not supported on this platform",
        ))
    }

    fn connection_error(&self, message: impl ToString) -> PlayerError {
        PlayerError::Connection {
            address: self.address.clone(),
            message: message.to_string(),
        }
    }
}

fn connect_tcp_with_timeout(address: &str, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in address.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "address resolved to nothing")
    }))
}

impl PlaybackClient for MpdClient {
    type Session = MpdSession;

    fn connect(&mut self) -> Result<MpdSession, PlayerError> {
        let stream = self.open_stream().map_err(|e| self.connection_error(e))?;
        let client = mpd::Client::new(stream).map_err(|e| self.connection_error(e))?;
        tracing::trace!(address = %self.address, "Opened MPD session");
        Ok(MpdSession { client })
    }
}

pub struct MpdSession {
    client: mpd::Client<Box<dyn Stream>>,
}

fn command_error(command: &'static str, err: MpdError) -> PlayerError {
    let kind = match &err {
        MpdError::Server(ServerError {
            code: ErrorCode::NoExist,
            ..
        }) => CommandErrorKind::NotFound,
        _ => CommandErrorKind::Other,
    };
    PlayerError::command(command, kind, err.to_string())
}

impl Session for MpdSession {
    fn authenticate(&mut self, credential: &Credential) -> Result<(), PlayerError> {
        self.client
            .login(credential.expose())
            .map_err(|e| PlayerError::Authentication(e.to_string()))
    }

    fn clear_queue(&mut self) -> Result<(), PlayerError> {
        self.client.clear().map_err(|e| command_error("clear", e))
    }

    fn load(&mut self, name: &str) -> Result<(), PlayerError> {
        self.client.load(name, ..).map_err(|e| command_error("load", e))
    }

    fn enable_shuffle(&mut self) -> Result<(), PlayerError> {
        self.client.shuffle(..).map_err(|e| command_error("shuffle", e))
    }

    fn play(&mut self) -> Result<(), PlayerError> {
        self.client.play().map_err(|e| command_error("play", e))
    }

    fn pause(&mut self) -> Result<(), PlayerError> {
        self.client.pause(true).map_err(|e| command_error("pause", e))
    }

    fn disconnect(self) {
        // Dropping the client closes the socket.
        drop(self.client);
        tracing::trace!("Closed MPD session");
    }
}
