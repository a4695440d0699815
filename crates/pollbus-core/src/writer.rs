//! Single-writer task owning every mutation of the log.
//!
//! `append` is a read-modify-write of the whole snapshot. Running every such
//! cycle on one task, fed by a channel, keeps concurrent appends in this
//! process from losing each other.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::log::SnapshotStore;
use crate::message::{IdSequence, Message};

const WRITE_QUEUE_DEPTH: usize = 100;

pub(crate) enum WriteCommand {
    Append {
        text: String,
        author: String,
        reply: oneshot::Sender<Result<Message>>,
    },
    Clear {
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Spawn the writer and return the channel feeding it.
pub(crate) fn spawn(
    snapshots: Arc<SnapshotStore>,
    capacity: usize,
    ids: IdSequence,
) -> mpsc::Sender<WriteCommand> {
    let (tx, rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
    let writer = LogWriter {
        snapshots,
        capacity,
        ids,
    };
    tokio::spawn(writer.run(rx));
    tx
}

struct LogWriter {
    snapshots: Arc<SnapshotStore>,
    capacity: usize,
    ids: IdSequence,
}

impl LogWriter {
    async fn run(mut self, mut rx: mpsc::Receiver<WriteCommand>) {
        while let Some(command) = rx.recv().await {
            match command {
                WriteCommand::Append {
                    text,
                    author,
                    reply,
                } => {
                    let result = self.append(text, author).await;
                    if let Err(e) = &result {
                        error!("Append failed: {}", e);
                    }
                    // The caller may have gone away; the write stands regardless.
                    let _ = reply.send(result);
                }
                WriteCommand::Clear { reply } => {
                    let result = self.snapshots.erase().await;
                    match &result {
                        Ok(()) => info!("Message log cleared"),
                        Err(e) => error!("Clear failed: {}", e),
                    }
                    let _ = reply.send(result);
                }
            }
        }
        debug!("All log handles dropped, writer stopping");
    }

    async fn append(&mut self, text: String, author: String) -> Result<Message> {
        let mut messages = self.snapshots.load().await?;

        let id = self.ids.mint(messages.last().map(|m| m.id))?;
        let message = Message::new(id, text, author);
        messages.push(message.clone());

        let overflow = messages.len().saturating_sub(self.capacity);
        if overflow > 0 {
            let evicted: Vec<_> = messages.drain(..overflow).map(|m| m.id).collect();
            debug!("Evicted {:?} to stay within capacity {}", evicted, self.capacity);
        }

        self.snapshots.save(&messages).await?;

        info!("New message {} from {}", message.id, message.author);
        Ok(message)
    }
}
