// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Handle identifying one subscriber of a [`BroadcastHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// The subscriber end of a broadcast: an id to release and a private receiver.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: flume::Receiver<T>,
}

impl<T> Subscription<T> {
    /// The id to pass back to the hub when unsubscribing.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Takes every event delivered since the last drain, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

/// Fans every published event out to all live subscribers.
///
/// Each subscriber owns an unbounded channel, so publishing never blocks and a slow
/// subscriber never holds back the others. Channels whose receiver was dropped are
/// pruned on the next publish.
#[derive(Debug)]
pub struct BroadcastHub<T: Clone + Send + 'static> {
    next_id: AtomicU64,
    subscribers: Mutex<BTreeMap<SubscriptionId, flume::Sender<T>>>,
}

impl<T: Clone + Send + 'static> BroadcastHub<T> {
    /// Creates a hub with no subscribers.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> Subscription<T> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = flume::unbounded();
        self.lock().insert(id, sender);
        log::trace!("Broadcast subscriber {id} registered.");
        Subscription { id, receiver }
    }

    /// Releases a subscriber. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            log::trace!("Broadcast subscriber {id} released.");
        }
        removed
    }

    /// Delivers `event` to every live subscriber and returns how many received it.
    pub fn publish(&self, event: T) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|id, sender| {
            let alive = sender.send(event.clone()).is_ok();
            if !alive {
                log::debug!("Pruning disconnected broadcast subscriber {id}.");
            }
            alive
        });
        subscribers.len()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<SubscriptionId, flume::Sender<T>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone + Send + 'static> Default for BroadcastHub<T> {
    fn default() -> Self {
        Self::new()
    }
}
