// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! The process-wide subscription registry: topic name to subscribed
//! session set, plus the reverse index needed to purge a terminated
//! session in one pass.
//!
//! Every critical section here is a short, non-awaiting map mutation, so a
//! blocking `std::sync::Mutex` is the right tool rather than an
//! async-aware one: no lock is ever held across an `.await`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use codec::{make_publish, Packet};
use tokio::sync::mpsc;

pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Added,
    AlreadySubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Removed,
    NotSubscribed,
}

struct Inner {
    /// topic -> subscribed session ids.
    topics: HashMap<String, HashSet<SessionId>>,
    /// session id -> topics it has subscribed to, purely to make `purge`
    /// a single pass instead of a scan over every topic.
    subscriptions: HashMap<SessionId, HashSet<String>>,
    /// session id -> its outbox, so `deliver` can enqueue without the
    /// session itself being in the call chain.
    outboxes: HashMap<SessionId, mpsc::Sender<Packet>>,
}

pub struct Registry(Mutex<Inner>);

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self(Mutex::new(Inner {
            topics: HashMap::new(),
            subscriptions: HashMap::new(),
            outboxes: HashMap::new(),
        }))
    }

    /// Registers a session's outbox so that `deliver` can reach it. Must be
    /// called before any `subscribe` for that session id.
    pub fn register(&self, id: SessionId, outbox: mpsc::Sender<Packet>) {
        let mut inner = self.0.lock().expect("registry mutex poisoned");
        inner.outboxes.insert(id, outbox);
    }

    pub fn subscribe(&self, id: SessionId, topic: String) -> SubscribeOutcome {
        let mut inner = self.0.lock().expect("registry mutex poisoned");
        let newly_in_topic = inner.topics.entry(topic.clone()).or_default().insert(id);
        let newly_in_reverse = inner.subscriptions.entry(id).or_default().insert(topic);
        if newly_in_topic || newly_in_reverse {
            SubscribeOutcome::Added
        } else {
            SubscribeOutcome::AlreadySubscribed
        }
    }

    pub fn unsubscribe(&self, id: SessionId, topic: &str) -> UnsubscribeOutcome {
        let mut inner = self.0.lock().expect("registry mutex poisoned");
        let removed_from_topic = if let Some(subscribers) = inner.topics.get_mut(topic) {
            let removed = subscribers.remove(&id);
            if subscribers.is_empty() {
                inner.topics.remove(topic);
            }
            removed
        } else {
            false
        };
        let removed_from_reverse = inner
            .subscriptions
            .get_mut(&id)
            .is_some_and(|topics| topics.remove(topic));
        if removed_from_topic || removed_from_reverse {
            UnsubscribeOutcome::Removed
        } else {
            UnsubscribeOutcome::NotSubscribed
        }
    }

    /// Enqueues a PUBLISH built from `(topic, payload)` onto every session
    /// currently subscribed to `topic`. A full outbox drops that
    /// recipient's copy only; the publisher is never blocked.
    pub fn deliver(&self, topic: &str, payload: &[u8]) {
        let inner = self.0.lock().expect("registry mutex poisoned");
        let Some(subscribers) = inner.topics.get(topic) else {
            return;
        };
        for subscriber in subscribers {
            let Some(outbox) = inner.outboxes.get(subscriber) else {
                continue;
            };
            let packet = make_publish(topic.to_owned(), payload.to_vec());
            if outbox.try_send(packet).is_err() {
                log::warn!(
                    "session {subscriber}: outbox full, dropping publish to topic {topic:?}"
                );
            }
        }
    }

    /// Removes `id` from every topic it subscribed to and drops its
    /// outbox registration. Called on every termination path before the
    /// session's own outbox channel is dropped, satisfying the invariant
    /// that registry cleanup always precedes outbox teardown.
    pub fn purge(&self, id: SessionId) {
        let mut inner = self.0.lock().expect("registry mutex poisoned");
        if let Some(topics) = inner.subscriptions.remove(&id) {
            for topic in topics {
                if let Some(subscribers) = inner.topics.get_mut(&topic) {
                    subscribers.remove(&id);
                    if subscribers.is_empty() {
                        inner.topics.remove(&topic);
                    }
                }
            }
        }
        inner.outboxes.remove(&id);
    }

    #[cfg(test)]
    fn is_subscribed(&self, id: SessionId, topic: &str) -> bool {
        let inner = self.0.lock().expect("registry mutex poisoned");
        inner.topics.get(topic).is_some_and(|s| s.contains(&id))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (mpsc::Sender<Packet>, mpsc::Receiver<Packet>) {
        mpsc::channel(8)
    }

    #[test]
    fn subscribe_is_idempotent() {
        let registry = Registry::new();
        let (tx, _rx) = channel();
        registry.register(1, tx);
        assert_eq!(registry.subscribe(1, "/a".to_owned()), SubscribeOutcome::Added);
        assert_eq!(registry.subscribe(1, "/a".to_owned()), SubscribeOutcome::AlreadySubscribed);
        assert!(registry.is_subscribed(1, "/a"));
    }

    #[test]
    fn purge_removes_every_topic() {
        let registry = Registry::new();
        let (tx, _rx) = channel();
        registry.register(1, tx);
        registry.subscribe(1, "/a".to_owned());
        registry.subscribe(1, "/b".to_owned());
        registry.purge(1);
        assert!(!registry.is_subscribed(1, "/a"));
        assert!(!registry.is_subscribed(1, "/b"));
        assert!(registry.0.lock().unwrap().topics.is_empty());
    }

    #[tokio::test]
    async fn fan_out_reaches_every_subscriber_after_subscribe_completes() {
        let registry = Registry::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        registry.register(1, tx_a);
        registry.register(2, tx_b);
        registry.subscribe(1, "/a".to_owned());
        registry.subscribe(2, "/a".to_owned());

        registry.deliver("/a", b"hi");

        let got_a = rx_a.recv().await.unwrap();
        let got_b = rx_b.recv().await.unwrap();
        assert_eq!(got_a, make_publish("/a".to_owned(), b"hi".to_vec()));
        assert_eq!(got_b, make_publish("/a".to_owned(), b"hi".to_vec()));
    }

    #[tokio::test]
    async fn unsubscribed_session_receives_nothing() {
        let registry = Registry::new();
        let (tx, mut rx) = channel();
        registry.register(1, tx);
        registry.subscribe(1, "/a".to_owned());
        registry.unsubscribe(1, "/a");

        registry.deliver("/a", b"hi");

        // No message should ever arrive; close the sender side implicitly
        // by dropping the registry, then assert the channel is empty/closed.
        drop(registry);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn full_outbox_drops_only_that_recipient() {
        let registry = Registry::new();
        let (tx_a, mut rx_a) = mpsc::channel(1);
        let (tx_b, mut rx_b) = mpsc::channel(1);
        registry.register(1, tx_a);
        registry.register(2, tx_b);
        registry.subscribe(1, "/a".to_owned());
        registry.subscribe(2, "/a".to_owned());

        // Fill session 1's outbox so the next deliver drops its copy.
        registry.deliver("/a", b"first");
        registry.deliver("/a", b"second");

        // Session 1 only ever got the first message; its outbox was full
        // for the second and it was dropped, not queued or blocking.
        assert_eq!(rx_a.recv().await.unwrap(), make_publish("/a".to_owned(), b"first".to_vec()));
        assert!(rx_a.try_recv().is_err());

        // Session 2 got both.
        assert_eq!(rx_b.recv().await.unwrap(), make_publish("/a".to_owned(), b"first".to_vec()));
        assert_eq!(rx_b.recv().await.unwrap(), make_publish("/a".to_owned(), b"second".to_vec()));
    }
}
