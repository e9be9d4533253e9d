//! Runs backend calls off the UI thread.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{ChatBackend, ClientError};
use crate::conversation::Turn;

/// Identifies one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Outcome of one request.
#[derive(Debug)]
pub struct Reply {
    pub id: RequestId,
    pub result: Result<String, ClientError>,
    pub elapsed: Duration,
}

/// Spawns one thread per request and collects results over a channel.
pub struct ReplyWorker {
    backend: Arc<dyn ChatBackend>,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
    next_id: u64,
}

impl ReplyWorker {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            tx,
            rx,
            next_id: 0,
        }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Start generating a reply for `context`.
    pub fn submit(&mut self, context: Vec<Turn>) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("reply-{}", id.0))
            .spawn(move || {
                let started = Instant::now();
                let result = backend.generate(&context);
                let reply = Reply {
                    id,
                    result,
                    elapsed: started.elapsed(),
                };
                // The receiver is gone only when the app is shutting down.
                let _ = tx.send(reply);
            });

        if let Err(err) = spawned {
            warn!(error = %err, "failed to spawn reply thread");
            let _ = self.tx.send(Reply {
                id,
                result: Err(ClientError::Transport(format!(
                    "could not start request: {err}"
                ))),
                elapsed: Duration::ZERO,
            });
        } else {
            debug!(request = id.0, "request submitted");
        }
        id
    }

    /// Next finished reply, if any.
    pub fn try_recv(&self) -> Option<Reply> {
        self.rx.try_recv().ok()
    }

    /// Block until a reply arrives or `timeout` passes.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Reply> {
        self.rx.recv_timeout(timeout).ok()
    }
}
