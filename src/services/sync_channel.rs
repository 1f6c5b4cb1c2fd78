//! Outbound side of the shell-to-UI sync channel.
//!
//! Every notification is stamped with the next sequence number and sent, in
//! call order, to each live subscriber over its own unbounded
//! `tokio::sync::mpsc` channel. Sending never blocks the control thread.
//! Subscribers whose receiver was dropped are pruned on the next publish.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use crate::types::intent::{Envelope, ShellEvent};

#[derive(Debug, Default)]
pub struct SyncChannel {
    next_seq: u64,
    subscribers: Vec<UnboundedSender<Envelope>>,
}

impl SyncChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber. It receives notifications published from now on.
    pub fn subscribe(&mut self) -> UnboundedReceiver<Envelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Stamps and fans out one notification. Returns its sequence number.
    pub fn publish(&mut self, event: ShellEvent) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| {
            tx.send(Envelope {
                seq,
                event: event.clone(),
            })
            .is_ok()
        });
        if self.subscribers.len() < before {
            debug!(dropped = before - self.subscribers.len(), "pruned closed subscribers");
        }
        trace!(seq, "published");
        seq
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Sequence number of the last published notification, 0 before any.
    pub fn last_seq(&self) -> u64 {
        self.next_seq
    }
}
