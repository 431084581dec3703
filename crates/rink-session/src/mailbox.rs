//! The per-player bounded mailbox.
//!
//! Every registered player owns exactly one mailbox: the queue of
//! outbound [`GameMessage`]s awaiting delivery on that player's
//! stream. The broadcast path enqueues into it (from *other* players'
//! dispatch loops, possibly in parallel); the owning player's dispatch
//! loop drains it.
//!
//! Two properties are load-bearing:
//!
//! - **`enqueue` never blocks.** Broadcast happens while the hub's
//!   registry lock is held; a blocking enqueue there would let one slow
//!   consumer wedge every connection. Overflow is resolved immediately
//!   by the configured [`OverflowPolicy`] instead.
//! - **`recv` is cancellation-safe.** The dispatch loop polls it inside
//!   `tokio::select!` against the inbound queue. `recv` only removes a
//!   message synchronously after its wakeup, and re-checks the queue
//!   before ever sleeping, so a message can't be lost to a cancelled
//!   branch — at worst its delivery is picked up on the next loop
//!   iteration.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rink_protocol::GameMessage;
use tokio::sync::Notify;

/// What to do when a message arrives at a full mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued message to make room. The newest data
    /// wins, which suits high-frequency state sync where the latest
    /// value matters more than every value.
    #[default]
    DropOldest,

    /// Refuse the new message and report
    /// [`MailboxFull`](crate::RegistryError::MailboxFull) to the
    /// caller.
    Reject,
}

/// Unit error: the mailbox is at capacity under
/// [`OverflowPolicy::Reject`]. The registry attaches the owner's ID
/// when surfacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxFull;

/// The outcome of a successful enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued with room to spare.
    Delivered,
    /// Queued, but the oldest message was evicted to make room.
    DroppedOldest,
    /// The mailbox was already closed; the message was discarded.
    /// Not an error — the session is tearing down.
    Discarded,
}

struct Queue {
    items: VecDeque<GameMessage>,
    closed: bool,
}

/// A bounded FIFO queue of outbound messages for one player.
///
/// Shared as `Arc<Mailbox>`: the registry holds one reference inside
/// the session record, and the owning connection's dispatch loop holds
/// another so it can drain without touching the registry lock.
pub struct Mailbox {
    queue: Mutex<Queue>,
    notify: Notify,
    capacity: usize,
    policy: OverflowPolicy,
    /// Messages evicted by `DropOldest` — the backpressure counter.
    dropped: AtomicU64,
}

impl Mailbox {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            queue: Mutex::new(Queue {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
            policy,
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends a message, resolving overflow without blocking.
    ///
    /// Fails only under [`OverflowPolicy::Reject`] when the mailbox is
    /// at capacity.
    pub fn enqueue(
        &self,
        msg: GameMessage,
    ) -> Result<Delivery, MailboxFull> {
        let mut queue = self.queue.lock().expect("mailbox lock poisoned");
        if queue.closed {
            return Ok(Delivery::Discarded);
        }

        let delivery = if queue.items.len() >= self.capacity {
            match self.policy {
                OverflowPolicy::Reject => return Err(MailboxFull),
                OverflowPolicy::DropOldest => {
                    queue.items.pop_front();
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    Delivery::DroppedOldest
                }
            }
        } else {
            Delivery::Delivered
        };

        queue.items.push_back(msg);
        drop(queue);
        self.notify.notify_one();
        Ok(delivery)
    }

    /// Waits for and removes the next message, in FIFO order.
    ///
    /// Returns `None` once the mailbox has been closed; anything still
    /// queued at close time was discarded, per the teardown contract.
    pub async fn recv(&self) -> Option<GameMessage> {
        loop {
            {
                let mut queue =
                    self.queue.lock().expect("mailbox lock poisoned");
                if queue.closed {
                    return None;
                }
                if let Some(msg) = queue.items.pop_front() {
                    return Some(msg);
                }
            }
            self.notify.notified().await;
        }
    }

    /// Closes the mailbox: discards everything queued, wakes the
    /// consumer, and makes future enqueues no-ops.
    ///
    /// Returns how many queued messages were discarded.
    pub fn close(&self) -> usize {
        let mut queue = self.queue.lock().expect("mailbox lock poisoned");
        queue.closed = true;
        let discarded = queue.items.len();
        queue.items.clear();
        drop(queue);
        self.notify.notify_one();
        discarded
    }

    /// `true` until [`close`](Self::close) is called.
    pub fn is_open(&self) -> bool {
        !self.queue.lock().expect("mailbox lock poisoned").closed
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.queue.lock().expect("mailbox lock poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total messages evicted by `DropOldest` since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use rink_protocol::{Action, EntityState, GameMessage};

    use super::*;

    /// An entity-state message whose entity_id doubles as a sequence
    /// marker, so FIFO order is checkable.
    fn msg(n: u32) -> GameMessage {
        GameMessage {
            sender: "s".into(),
            action: Some(Action::EntityState(EntityState {
                room_id: "r".into(),
                entity_id: n,
                ..EntityState::default()
            })),
        }
    }

    fn seq(m: &GameMessage) -> u32 {
        match &m.action {
            Some(Action::EntityState(e)) => e.entity_id,
            _ => panic!("expected entity state"),
        }
    }

    // =====================================================================
    // enqueue() / recv()
    // =====================================================================

    #[tokio::test]
    async fn test_recv_preserves_fifo_order() {
        let mailbox = Mailbox::new(100, OverflowPolicy::DropOldest);
        for n in 0..5 {
            assert_eq!(mailbox.enqueue(msg(n)), Ok(Delivery::Delivered));
        }

        for n in 0..5 {
            let got = mailbox.recv().await.expect("should have message");
            assert_eq!(seq(&got), n);
        }
        assert!(mailbox.is_empty());
    }

    #[tokio::test]
    async fn test_recv_wakes_on_enqueue() {
        use std::sync::Arc;

        let mailbox = Arc::new(Mailbox::new(10, OverflowPolicy::default()));
        let consumer = {
            let mailbox = Arc::clone(&mailbox);
            tokio::spawn(async move { mailbox.recv().await })
        };

        // Give the consumer a chance to park on the Notify first.
        tokio::task::yield_now().await;
        mailbox.enqueue(msg(7)).unwrap();

        let got = consumer
            .await
            .expect("task should complete")
            .expect("should have message");
        assert_eq!(seq(&got), 7);
    }

    // =====================================================================
    // Overflow policies
    // =====================================================================

    #[test]
    fn test_enqueue_drop_oldest_evicts_head_and_counts() {
        let mailbox = Mailbox::new(3, OverflowPolicy::DropOldest);
        for n in 0..3 {
            mailbox.enqueue(msg(n)).unwrap();
        }

        assert_eq!(mailbox.enqueue(msg(3)), Ok(Delivery::DroppedOldest));

        // msg(0) is gone, the rest shifted up, the counter moved.
        assert_eq!(mailbox.len(), 3);
        assert_eq!(mailbox.dropped(), 1);
    }

    #[tokio::test]
    async fn test_drop_oldest_keeps_newest_messages() {
        let mailbox = Mailbox::new(2, OverflowPolicy::DropOldest);
        for n in 0..4 {
            mailbox.enqueue(msg(n)).unwrap();
        }

        assert_eq!(seq(&mailbox.recv().await.unwrap()), 2);
        assert_eq!(seq(&mailbox.recv().await.unwrap()), 3);
    }

    #[test]
    fn test_enqueue_reject_policy_refuses_when_full() {
        let mailbox = Mailbox::new(2, OverflowPolicy::Reject);
        mailbox.enqueue(msg(0)).unwrap();
        mailbox.enqueue(msg(1)).unwrap();

        assert_eq!(mailbox.enqueue(msg(2)), Err(MailboxFull));
        // Nothing was evicted and nothing was counted as dropped.
        assert_eq!(mailbox.len(), 2);
        assert_eq!(mailbox.dropped(), 0);
    }

    // =====================================================================
    // close()
    // =====================================================================

    #[tokio::test]
    async fn test_close_discards_queued_and_unblocks_recv() {
        let mailbox = Mailbox::new(10, OverflowPolicy::default());
        mailbox.enqueue(msg(0)).unwrap();
        mailbox.enqueue(msg(1)).unwrap();

        assert_eq!(mailbox.close(), 2);
        assert!(!mailbox.is_open());
        assert!(mailbox.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_parked_consumer() {
        use std::sync::Arc;

        let mailbox = Arc::new(Mailbox::new(10, OverflowPolicy::default()));
        let consumer = {
            let mailbox = Arc::clone(&mailbox);
            tokio::spawn(async move { mailbox.recv().await })
        };

        tokio::task::yield_now().await;
        mailbox.close();

        let got = consumer.await.expect("task should complete");
        assert!(got.is_none(), "recv should observe the close");
    }

    #[test]
    fn test_enqueue_after_close_is_discarded() {
        let mailbox = Mailbox::new(10, OverflowPolicy::default());
        mailbox.close();

        assert_eq!(mailbox.enqueue(msg(0)), Ok(Delivery::Discarded));
        assert_eq!(mailbox.len(), 0);
    }
}
