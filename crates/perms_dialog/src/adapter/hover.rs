//! Hover settle scheduling.
//!
//! Hovering a node starts a timer task; when it fires, the task sends a
//! [`HoverSettled`] message back to the owner's event loop. Each row has at
//! most one pending task, identified by a ticket that is never reused.
//! Leaving the node aborts the task, and the owner must still check
//! [`HoverScheduler::settle`] before acting, because a message can already be
//! queued when the abort happens.
//!
//! ```text
//! hover_enter(row, node) ──► pending[row] = ticket ──► spawn(sleep(delay); send(ticket))
//!                                                           │
//! hover_leave(row, node) ──► abort task, drop pending[row]  │
//!                                                           ▼
//!                      settle(msg): pending[row].ticket == msg.ticket ? reveal : drop
//! ```
//!
//! A message queued for an earlier hover of the same node carries an older
//! ticket and is dropped.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::trace;

use crate::controls::RowId;

/// Message sent when a hover timer fires
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSettled {
    /// Row whose tree holds the node
    pub row: RowId,
    /// Hovered node id
    pub node: String,
    /// Top coordinate of the node reported with the hover
    pub top: f32,
    /// Ticket of the hover that scheduled the timer
    pub ticket: u64,
}

struct PendingHover {
    node: String,
    ticket: u64,
    task: JoinHandle<()>,
}

/// Cancelable per-row hover timers
///
/// Scheduling spawns a tokio task, so it must run inside a tokio runtime.
pub struct HoverScheduler {
    delay: Duration,
    tx: mpsc::UnboundedSender<HoverSettled>,
    rx: mpsc::UnboundedReceiver<HoverSettled>,
    pending: HashMap<RowId, PendingHover>,
    next_ticket: u64,
}

impl HoverScheduler {
    /// Create a scheduler firing after `delay`
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            tx,
            rx,
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Focus `node` and start its timer, replacing any timer of the row
    ///
    /// Returns the ticket the timer's message will carry.
    pub fn schedule(&mut self, row: RowId, node: &str, top: f32) -> u64 {
        self.cancel_row(row);
        self.next_ticket += 1;
        let ticket = self.next_ticket;

        let tx = self.tx.clone();
        let delay = self.delay;
        let message = HoverSettled {
            row,
            node: node.to_string(),
            top,
            ticket,
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver lives as long as the scheduler
            let _ = tx.send(message);
        });

        trace!(
            "Hover timer {} scheduled for row {} node '{}'",
            ticket, row, node
        );
        self.pending.insert(
            row,
            PendingHover {
                node: node.to_string(),
                ticket,
                task,
            },
        );
        ticket
    }

    /// Abort the timer for `node`
    ///
    /// Returns whether `node` was the focused node of the row.
    pub fn cancel(&mut self, row: RowId, node: &str) -> bool {
        if !self.is_focused(row, node) {
            return false;
        }
        if let Some(pending) = self.pending.remove(&row) {
            pending.task.abort();
            trace!("Hover timer {} canceled for row {} node '{}'", pending.ticket, row, node);
        }
        true
    }

    /// Abort any timer of the row
    pub fn cancel_row(&mut self, row: RowId) {
        if let Some(pending) = self.pending.remove(&row) {
            pending.task.abort();
        }
    }

    /// Whether `node` is the focused node of `row` with its timer not yet settled
    pub fn is_focused(&self, row: RowId, node: &str) -> bool {
        self.pending.get(&row).is_some_and(|p| p.node == node)
    }

    /// Number of timers not yet fired or canceled
    pub fn pending(&self) -> usize {
        self.pending
            .values()
            .filter(|p| !p.task.is_finished())
            .count()
    }

    /// Accept a fired timer message if it belongs to the row's current hover
    pub fn settle(&mut self, message: &HoverSettled) -> bool {
        let current = self
            .pending
            .get(&message.row)
            .is_some_and(|p| p.ticket == message.ticket);
        if !current {
            trace!(
                "Dropping stale hover {} for row {} node '{}'",
                message.ticket,
                message.row,
                message.node
            );
            return false;
        }
        self.pending.remove(&message.row);
        true
    }

    /// Wait for the next fired timer until `deadline`
    pub async fn next_until(&mut self, deadline: Instant) -> Option<HoverSettled> {
        match timeout_at(deadline, self.rx.recv()).await {
            Ok(message) => message,
            Err(_) => None,
        }
    }
}

impl Drop for HoverScheduler {
    fn drop(&mut self) {
        for pending in self.pending.values() {
            pending.task.abort();
        }
    }
}
