//! Sequencer as a single-threaded actor.
//!
//! An alternative to sharing the sequencer behind its lock: one tokio task
//! owns it and drains a request queue, so every call is serialized by
//! construction. Callers hold a cheap, cloneable [`SequencerHandle`].

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use logsync_store::LogStore;

use crate::error::{Result, SyncError};
use crate::messages::Message;
use crate::sequencer::Sequencer;

/// Default request queue depth.
pub const DEFAULT_QUEUE_DEPTH: usize = 1000;

struct Request {
    message: Message,
    reply: oneshot::Sender<Option<Message>>,
}

/// Spawns sequencer actors.
pub struct SequencerActor;

impl SequencerActor {
    /// Move `sequencer` onto a tokio task and return a handle to it.
    ///
    /// Must be called from within a tokio runtime. The task exits once every
    /// handle has been dropped.
    pub fn spawn<L>(sequencer: Arc<Sequencer<L>>, queue_depth: usize) -> SequencerHandle
    where
        L: LogStore + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Request>(queue_depth.max(1));

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let response = sequencer.handle(Some(request.message));
                if request.reply.send(response).is_err() {
                    tracing::trace!("caller went away before the reply");
                }
            }
            tracing::debug!("sequencer actor stopped");
        });

        SequencerHandle { tx }
    }
}

/// Handle to a running sequencer actor.
#[derive(Clone)]
pub struct SequencerHandle {
    tx: mpsc::Sender<Request>,
}

impl SequencerHandle {
    /// Send a message to the sequencer and wait for its response.
    ///
    /// An absent message is answered with `None` without a round trip.
    pub async fn call(&self, message: Option<Message>) -> Result<Option<Message>> {
        let Some(message) = message else {
            return Ok(None);
        };

        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request { message, reply })
            .await
            .map_err(|_| SyncError::ActorClosed)?;

        response.await.map_err(|_| SyncError::ActorClosed)
    }
}
