//! Bounded recency cache deciding whether a pairing is novel.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A pairing key and the last time it was accepted as novel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording<K> {
    key: K,
    time: u64,
}

impl<K> Recording<K> {
    pub fn new(key: K, time: u64) -> Self {
        Self { key, time }
    }

    // Getters
    pub fn key(&self) -> &K { &self.key }
    pub fn time(&self) -> u64 { self.time }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    time: u64,
    seq: u64, // Position stamp in `order`
}

/// Remembers which pairings an association used recently.
///
/// Records are kept oldest-first. A key that recurs after its horizon is
/// refreshed and moved to the newest position, so eviction always drops the
/// least recently accepted pairing. After any insert at most
/// `record_length - 1` records are retained.
#[derive(Debug, Clone)]
pub struct LinkNoveltyTracker<K> {
    owner: K,
    record_length: usize,
    index: HashMap<K, Slot>,
    // Oldest-first; an entry whose seq differs from the index is stale
    order: VecDeque<(u64, K)>,
    next_seq: u64,
}

impl<K: Eq + Hash + Clone> LinkNoveltyTracker<K> {
    /// Creates an empty tracker for the association identified by `owner`
    pub fn new(owner: K, record_length: usize) -> Self {
        let retained = record_length.saturating_sub(1);
        Self {
            owner,
            record_length,
            index: HashMap::with_capacity(retained),
            order: VecDeque::with_capacity(retained),
            next_seq: 0,
        }
    }

    // Getters
    pub fn owner(&self) -> &K { &self.owner }
    pub fn record_length(&self) -> usize { self.record_length }
    pub fn len(&self) -> usize { self.index.len() }
    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// Most records the tracker keeps at once
    pub fn retained_capacity(&self) -> usize {
        self.record_length.saturating_sub(1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Last time `key` was accepted, if it is still remembered
    pub fn last_seen(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|slot| slot.time)
    }

    /// Checks whether `candidate` is novel at `current_time`.
    ///
    /// Accepting a candidate records it (or refreshes its time) as a side
    /// effect. The owner's own key is never novel unless `allow_self_match`.
    pub fn novel(
        &mut self,
        candidate: &K,
        current_time: u64,
        horizon: u64,
        allow_self_match: bool,
    ) -> bool {
        if !allow_self_match && *candidate == self.owner {
            return false;
        }

        if let Some(slot) = self.index.get_mut(candidate) {
            if current_time < slot.time.saturating_add(horizon) {
                return false;
            }
            let seq = self.next_seq;
            self.next_seq += 1;
            slot.time = current_time;
            slot.seq = seq;
            self.order.push_back((seq, candidate.clone()));
            self.compact();
            return true;
        }

        while !self.index.is_empty() && self.index.len() + 1 >= self.record_length {
            self.evict_oldest();
        }

        // record_length <= 1 leaves no room at all
        if self.index.len() + 1 < self.record_length {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.index.insert(candidate.clone(), Slot { time: current_time, seq });
            self.order.push_back((seq, candidate.clone()));
        }
        true
    }

    /// Records in oldest-first order
    pub fn records(&self) -> Vec<Recording<K>> {
        self.order
            .iter()
            .filter_map(|(seq, key)| {
                self.index
                    .get(key)
                    .filter(|slot| slot.seq == *seq)
                    .map(|slot| Recording::new(key.clone(), slot.time))
            })
            .collect()
    }

    /// Keys in oldest-first order
    pub fn keys(&self) -> Vec<K> {
        self.records().into_iter().map(|r| r.key).collect()
    }

    /// Forgets every record; the owner is untouched
    pub fn end(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    /// Removes and returns the oldest live record
    fn evict_oldest(&mut self) -> Option<Recording<K>> {
        while let Some((seq, key)) = self.order.pop_front() {
            let live = self.index.get(&key).map_or(false, |slot| slot.seq == seq);
            if live {
                return self
                    .index
                    .remove(&key)
                    .map(|slot| Recording::new(key, slot.time));
            }
        }
        None
    }

    /// Drops stale ordering entries once they outnumber the live ones
    fn compact(&mut self) {
        if self.order.len() <= 2 * self.index.len() + 8 {
            return;
        }
        let index = &self.index;
        self.order
            .retain(|(seq, key)| index.get(key).map_or(false, |slot| slot.seq == *seq));
    }
}
