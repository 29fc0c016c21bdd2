use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::context::ContextId;
use crate::time::KerberosTimestamp;

/// What identifies one inbound message to a [`ReplayCache`]
///
/// The sequence number, when the message carries one, tells apart genuine messages stamped
/// within the same microsecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Authenticator {
    pub timestamp: KerberosTimestamp,
    pub seq_number: Option<u32>,
}

impl Authenticator {
    pub fn new(timestamp: KerberosTimestamp, seq_number: Option<u32>) -> Self {
        Self { timestamp, seq_number }
    }
}

/// Memory of the authenticators already accepted
///
/// The verifier first asks [`ReplayCache::contains`] while checking a message, and records the
/// message with [`ReplayCache::check_and_insert`] only once its checksum or decryption succeeded,
/// so that forged messages can't evict or shadow genuine ones.
pub trait ReplayCache: Send + Sync {
    /// Whether this authenticator has been recorded already.
    fn contains(&self, context_id: ContextId, authenticator: Authenticator) -> bool;

    /// Records the authenticator, returns `false` if it was already present.
    fn check_and_insert(&self, context_id: ContextId, authenticator: Authenticator) -> bool;
}

pub const DEFAULT_REPLAY_CACHE_CAPACITY: usize = 8192;

type Entry = (ContextId, Authenticator);

#[derive(Debug, Default)]
struct Entries {
    seen: HashSet<Entry>,
    order: VecDeque<Entry>,
}

/// In-memory [`ReplayCache`] forgetting the oldest entries beyond its capacity
#[derive(Debug)]
pub struct MemoryReplayCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl MemoryReplayCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Both collections are updated under the same guard, without any fallible step in between.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryReplayCache {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_CACHE_CAPACITY)
    }
}

impl ReplayCache for MemoryReplayCache {
    fn contains(&self, context_id: ContextId, authenticator: Authenticator) -> bool {
        self.lock().seen.contains(&(context_id, authenticator))
    }

    fn check_and_insert(&self, context_id: ContextId, authenticator: Authenticator) -> bool {
        let mut entries = self.lock();
        let entry = (context_id, authenticator);

        if !entries.seen.insert(entry) {
            return false;
        }

        entries.order.push_back(entry);

        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.seen.remove(&oldest);
            }
        }

        true
    }
}
