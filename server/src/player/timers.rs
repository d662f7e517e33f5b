//! Per-row cancelable timers.
//!
//! Every row gets a [`RowTicket`] whose sleeps are pause-aware, wake up early
//! on skip, and stop for good once the row is superseded. Starting a new row
//! cancels everything still pending for the previous one.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Outcome of a [`RowTicket::sleep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Elapsed,
    /// The row was skipped; finish up without waiting.
    Skipped,
    /// The row was superseded or the server is stopping; do not complete it.
    Cancelled,
}

/// Proof that a row finished playing. Only [`RowTicket::complete`] creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCompleted {
    pub row_id: i64,
}

pub struct RowTimers {
    paused: watch::Sender<bool>,
    skip: watch::Sender<u64>,
    current: Mutex<Option<CancellationToken>>,
    root: CancellationToken,
}

impl Default for RowTimers {
    fn default() -> Self {
        Self::new(CancellationToken::new())
    }
}

impl RowTimers {
    /// Timers whose tickets are all cancelled when `root` is.
    pub fn new(root: CancellationToken) -> Self {
        let (paused, _) = watch::channel(false);
        let (skip, _) = watch::channel(0);
        Self {
            paused,
            skip,
            current: Mutex::new(None),
            root,
        }
    }

    /// Cancel the previous row's pending sleeps and issue a ticket for `row_id`.
    pub fn start_row(&self, row_id: i64) -> RowTicket {
        let token = self.root.child_token();
        {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
        }

        let mut skip = self.skip.subscribe();
        // A skip aimed at an earlier row must not leak into this one.
        skip.borrow_and_update();

        RowTicket {
            row_id,
            token,
            paused: self.paused.subscribe(),
            skip,
            skipped: false,
        }
    }

    pub fn cancel_row(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = current.take() {
            token.cancel();
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.send_replace(paused);
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Ask the running row to finish immediately.
    pub fn skip(&self) {
        self.skip.send_modify(|n| *n = n.wrapping_add(1));
    }
}

/// What woke a sleeping ticket.
enum Wake {
    Cancelled,
    Skipped,
    PauseChanged,
    Elapsed,
}

/// Timer handle for a single row.
pub struct RowTicket {
    row_id: i64,
    token: CancellationToken,
    paused: watch::Receiver<bool>,
    skip: watch::Receiver<u64>,
    skipped: bool,
}

impl RowTicket {
    pub fn row_id(&self) -> i64 {
        self.row_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether a skip was observed for this row.
    pub fn skipped(&mut self) -> bool {
        if !self.skipped && self.skip.has_changed().unwrap_or(false) {
            self.skip.borrow_and_update();
            self.skipped = true;
        }
        self.skipped
    }

    /// Sleep for `duration` of unpaused time.
    pub async fn sleep(&mut self, duration: Duration) -> Tick {
        if self.token.is_cancelled() {
            return Tick::Cancelled;
        }
        if self.skipped() {
            return Tick::Skipped;
        }

        let mut remaining = duration;
        loop {
            let paused = *self.paused.borrow_and_update();
            let started = Instant::now();

            let wake = if paused {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Wake::Cancelled,
                    r = self.skip.changed() => match r {
                        Ok(()) => Wake::Skipped,
                        Err(_) => Wake::Cancelled,
                    },
                    r = self.paused.changed() => match r {
                        Ok(()) => Wake::PauseChanged,
                        Err(_) => Wake::Cancelled,
                    },
                }
            } else {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Wake::Cancelled,
                    r = self.skip.changed() => match r {
                        Ok(()) => Wake::Skipped,
                        Err(_) => Wake::Cancelled,
                    },
                    r = self.paused.changed() => match r {
                        Ok(()) => Wake::PauseChanged,
                        Err(_) => Wake::Cancelled,
                    },
                    _ = sleep(remaining) => Wake::Elapsed,
                }
            };

            match wake {
                Wake::Cancelled => return Tick::Cancelled,
                Wake::Skipped => {
                    self.skip.borrow_and_update();
                    self.skipped = true;
                    return Tick::Skipped;
                }
                Wake::PauseChanged => {
                    if !paused {
                        remaining = remaining.saturating_sub(started.elapsed());
                    }
                }
                Wake::Elapsed => return Tick::Elapsed,
            }
        }
    }

    /// Consume the ticket. A row can only be completed once per ticket.
    pub fn complete(self) -> RowCompleted {
        RowCompleted { row_id: self.row_id }
    }
}
