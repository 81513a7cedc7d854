//! # Keyed Publish/Subscribe Hub
//!
//! This module defines [`TopicHub`], a registry of subscribers keyed by topic.
//! Publishers fan an event out to every subscriber of one topic; subscribers
//! of other topics never see it.
//!
//! ## Delivery model
//! ```text
//! publish(topic, event)
//!     │
//!     ├──► [queue A] ──► subscriber A   (bounded, try_send)
//!     ├──► [queue B] ──► subscriber B   (full → event dropped for B only)
//!     └──► [queue C] ──► pruned         (closed → subscriber removed)
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `publish` returns immediately; a stalled subscriber
//!   cannot stall the publisher or its topic peers.
//! - **Overflow**: a full queue loses that event for that subscriber only.
//! - **No replay**: subscribers receive only events published after they
//!   joined.
//! - **Re-subscribe**: subscribing a session that is already on the topic
//!   replaces its previous queue; a publish still reaches it exactly once.
//! - **Pruning**: a subscriber whose receiver was dropped is removed the next
//!   time its topic publishes.
//!
//! The registry itself is a sharded concurrent map, so subscribe/unsubscribe/
//! publish on unrelated topics never contend on a common lock.

use dashmap::DashMap;
use std::hash::Hash;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

struct Subscriber<S, E> {
    session: S,
    tx: mpsc::Sender<E>,
}

/// Keyed fan-out registry with one bounded queue per subscriber.
///
/// `K` is the topic key, `S` identifies a subscribing session, `E` is the
/// event type delivered to subscribers.
pub struct TopicHub<K, S, E> {
    topics: DashMap<K, Vec<Subscriber<S, E>>>,
    capacity: usize,
}

impl<K, S, E> TopicHub<K, S, E>
where
    K: Eq + Hash,
    S: PartialEq,
    E: Clone,
{
    /// Creates a hub whose subscriber queues hold up to `capacity` undelivered
    /// events each. A capacity below 1 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Registers `session` on `topic` and returns the receiving end of its
    /// queue.
    ///
    /// If the session is already subscribed to this topic, the old queue is
    /// replaced and its receiver goes quiet; each publish is still delivered
    /// to the session at most once.
    pub fn subscribe(&self, topic: K, session: S) -> mpsc::Receiver<E> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut subs = self.topics.entry(topic).or_default();
        subs.retain(|sub| sub.session != session);
        subs.push(Subscriber { session, tx });
        rx
    }

    /// Removes `session` from `topic`. No effect on other subscribers; no
    /// error if the session was not subscribed.
    pub fn unsubscribe(&self, topic: &K, session: &S) {
        if let Some(mut subs) = self.topics.get_mut(topic) {
            subs.retain(|sub| &sub.session != session);
            let emptied = subs.is_empty();
            drop(subs);
            if emptied {
                self.topics.remove_if(topic, |_, subs| subs.is_empty());
            }
        }
    }

    /// Delivers `event` to every live subscriber of `topic` and returns how
    /// many queues accepted it.
    ///
    /// Uses `try_send` per subscriber: a full queue drops the event for that
    /// subscriber, a closed queue drops the subscriber itself.
    pub fn publish(&self, topic: &K, event: E) -> usize {
        let Some(mut subs) = self.topics.get_mut(topic) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dropped = 0;
        subs.retain(|sub| match sub.tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => false,
        });
        let emptied = subs.is_empty();
        drop(subs);

        if emptied {
            self.topics.remove_if(topic, |_, subs| subs.is_empty());
        }
        if dropped > 0 {
            debug!(dropped, "subscriber queues full, events dropped");
        }
        delivered
    }

    /// Number of subscribers currently registered on `topic`.
    pub fn subscriber_count(&self, topic: &K) -> usize {
        self.topics.get(topic).map_or(0, |subs| subs.len())
    }

    /// Number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_topic_subscriber() {
        let hub: TopicHub<u32, &str, String> = TopicHub::new(8);
        let mut rx_a = hub.subscribe(1, "a");
        let mut rx_b = hub.subscribe(1, "b");

        assert_eq!(hub.publish(&1, "hello".to_string()), 2);
        assert_eq!(rx_a.recv().await.unwrap(), "hello");
        assert_eq!(rx_b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let hub: TopicHub<u32, &str, u8> = TopicHub::new(8);
        let mut rx_one = hub.subscribe(1, "watcher");
        let _rx_two = hub.subscribe(2, "watcher");

        assert_eq!(hub.publish(&2, 42), 1);
        assert!(rx_one.try_recv().is_err());
    }

    #[tokio::test]
    async fn resubscribe_delivers_once() {
        let hub: TopicHub<u32, &str, u8> = TopicHub::new(8);
        let _stale = hub.subscribe(1, "s");
        let mut fresh = hub.subscribe(1, "s");

        assert_eq!(hub.subscriber_count(&1), 1);
        assert_eq!(hub.publish(&1, 7), 1);
        assert_eq!(fresh.recv().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn closed_receivers_are_pruned_on_publish() {
        let hub: TopicHub<u32, &str, u8> = TopicHub::new(8);
        let rx = hub.subscribe(1, "gone");
        let mut rx_live = hub.subscribe(1, "live");
        drop(rx);

        assert_eq!(hub.publish(&1, 1), 1);
        assert_eq!(hub.subscriber_count(&1), 1);
        assert_eq!(rx_live.recv().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking_others() {
        let hub: TopicHub<u32, &str, u8> = TopicHub::new(1);
        let mut rx_slow = hub.subscribe(1, "slow");
        let mut rx_fast = hub.subscribe(1, "fast");

        assert_eq!(hub.publish(&1, 1), 2);
        // fast drains promptly; slow never does and its queue of one is full
        assert_eq!(rx_fast.recv().await.unwrap(), 1);
        assert_eq!(hub.publish(&1, 2), 1);

        assert_eq!(rx_fast.recv().await.unwrap(), 2);
        assert_eq!(rx_slow.recv().await.unwrap(), 1);
        assert!(rx_slow.try_recv().is_err());
        // slow stays subscribed and sees later events once it drains
        assert_eq!(hub.publish(&1, 3), 2);
        assert_eq!(rx_slow.recv().await.unwrap(), 3);
        assert_eq!(rx_fast.recv().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unsubscribe_drops_empty_topics() {
        let hub: TopicHub<u32, &str, u8> = TopicHub::new(8);
        let _rx = hub.subscribe(1, "s");
        assert_eq!(hub.topic_count(), 1);

        hub.unsubscribe(&1, &"s");
        assert_eq!(hub.topic_count(), 0);
        assert_eq!(hub.publish(&1, 9), 0);
    }
}
