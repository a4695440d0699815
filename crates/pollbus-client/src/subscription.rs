//! Continuous poll loop.
//!
//! Polls, hands every message to the receiver, moves the cursor to the last
//! token delivered and polls again. A 410 resets the cursor to the start;
//! transient failures are retried after `retry_delay`.

use pollbus_core::{Cursor, WireMessage};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::BusClient;
use crate::error::{ClientError, Result};

const CHANNEL_DEPTH: usize = 100;

impl BusClient {
    /// Follow the bus from `cursor` onwards.
    ///
    /// The loop runs on a spawned task until the receiver is dropped or an
    /// error that retrying cannot fix, which is delivered as the last item.
    pub fn subscribe(&self, cursor: Cursor) -> async_channel::Receiver<Result<WireMessage>> {
        let (tx, rx) = async_channel::bounded(CHANNEL_DEPTH);
        let client = self.clone();

        tokio::spawn(async move {
            let mut cursor = cursor;
            let mut failures: u32 = 0;

            while !tx.is_closed() {
                match client.poll(&cursor).await {
                    Ok(messages) => {
                        failures = 0;
                        for message in messages {
                            cursor = Cursor::After(message.t);
                            if tx.send(Ok(message)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(ClientError::HistoryDropped) => {
                        info!("Cursor {:?} no longer known to the server, resyncing", cursor.id());
                        cursor = Cursor::Start;
                    }
                    Err(e) if e.is_retryable() => {
                        failures += 1;
                        let exhausted = client
                            .config()
                            .max_retries
                            .is_some_and(|max| failures > max);
                        if exhausted {
                            warn!("Polling failed {} times in a row: {}", failures, e);
                            let _ = tx.send(Err(e)).await;
                            break;
                        }
                        debug!("Poll failed ({}), retrying", e);
                        sleep(client.config().retry_delay).await;
                    }
                    Err(e) => {
                        warn!("Polling stopped: {}", e);
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                }
            }
            debug!("Subscription ended");
        });

        rx
    }
}
