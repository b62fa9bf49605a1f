//! Per-operation daemon sessions

use crate::daemon::{BuildDaemon, DaemonConnection, ModelRequest};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Opens sessions against a build daemon. Sessions are never pooled.
pub struct ConnectionManager {
    daemon: Box<dyn BuildDaemon>,
}

impl ConnectionManager {
    pub fn new(daemon: Box<dyn BuildDaemon>) -> Self {
        Self { daemon }
    }

    pub fn open(&self, root: &Path) -> Result<Session> {
        debug!("Opening {} session for {}", self.daemon.name(), root.display());
        let handle = self.daemon.connect(root)?;
        Ok(Session {
            root: root.to_path_buf(),
            handle: Some(handle),
        })
    }

    /// Runs `body` with a fresh session and releases it on every exit path.
    ///
    /// When both the body and the release fail, the body's error is returned.
    pub fn with_session<T, F>(&self, root: &Path, body: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let mut session = self.open(root)?;
        let result = body(&mut session);
        let closed = session.close();

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_error)) => Err(close_error),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                warn!("Failed to release session for {}: {}", root.display(), close_error);
                Err(e)
            }
        }
    }
}

/// Exclusive handle on one daemon handshake for one project root
pub struct Session {
    root: PathBuf,
    handle: Option<Box<dyn DaemonConnection>>,
}

impl Session {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&mut self) -> Result<&mut Box<dyn DaemonConnection>> {
        self.handle
            .as_mut()
            .ok_or_else(|| Error::connection(&self.root, "session is closed"))
    }

    /// Fetch a model and decode it into `T`
    pub fn fetch_model<T: DeserializeOwned>(&mut self, request: &ModelRequest) -> Result<T> {
        debug!("Fetching model '{}' for {}", request.kind, self.root.display());
        let raw = self.handle()?.fetch_model(request)?;
        serde_json::from_value(raw).map_err(|e| {
            Error::remote_build(
                request.kind.name(),
                format!("unexpected model shape: {e}"),
            )
        })
    }

    /// Run tasks, copying the daemon's error output into `error_sink`
    pub fn run_tasks(&mut self, tasks: &[String], error_sink: &mut dyn Write) -> Result<()> {
        debug!("Running tasks {:?} in {}", tasks, self.root.display());
        self.handle()?.run_tasks(tasks, error_sink)
    }

    /// Release the handshake. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(mut handle) => handle.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to release session for {}: {}", self.root.display(), e);
        }
    }
}
