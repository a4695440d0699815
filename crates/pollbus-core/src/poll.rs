//! Long-poll coordinator.
//!
//! A poll re-reads the shared snapshot every `sleep_interval` until the
//! cursor has something new or the deadline passes. The store has no
//! notification primitive, so resumption is timer driven: each waiting poll
//! costs one store read per interval and adds at most one interval of
//! latency.
//!
//! Dropping the future returned by [`PollCoordinator::poll`] cancels it at
//! the current sleep; no background work is left behind.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::config::BusConfig;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::log::MessageLog;
use crate::message::Message;

#[derive(Clone)]
pub struct PollCoordinator {
    log: MessageLog,
    timeout: Duration,
    sleep_interval: Duration,
}

impl PollCoordinator {
    pub fn new(log: MessageLog, config: &BusConfig) -> Self {
        Self::with_timing(log, config.poll_timeout, config.sleep_interval)
    }

    pub fn with_timing(log: MessageLog, timeout: Duration, sleep_interval: Duration) -> Self {
        Self {
            log,
            timeout,
            sleep_interval,
        }
    }

    /// Wait for messages newer than `cursor`.
    ///
    /// Returns them as soon as a check finds any, or an empty vector once the
    /// timeout elapses. A storage failure ends the poll immediately.
    pub async fn poll(&self, cursor: Cursor) -> Result<Vec<Message>> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut checks: u32 = 0;

        loop {
            checks += 1;
            if let Some(new) = self.log.messages_since(&cursor).await? {
                if !new.is_empty() {
                    debug!(
                        "Poll after {:?} delivering {} messages ({} checks, {:?})",
                        cursor.id(),
                        new.len(),
                        checks,
                        started.elapsed()
                    );
                    return Ok(new);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    "Poll after {:?} timed out after {} checks",
                    cursor.id(),
                    checks
                );
                return Ok(Vec::new());
            }

            sleep_until((now + self.sleep_interval).min(deadline)).await;
        }
    }
}
