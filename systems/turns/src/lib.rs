#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Discrete-event turn order for every active entity on the current map.
//!
//! Entities are popped by ascending `next_action_time`, then by the fixed
//! per-class sequence, so the player always acts before any trainer that is
//! due at the same moment. Ties within one class fall back to the entity
//! identifier, which keeps replays exactly reproducible.

use std::cmp::Ordering;

use overworld_core::{queue::MinQueue, EntityId, EntitySnapshot};

/// Scheduling record for one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TurnEntry {
    /// Entity that will act.
    pub entity: EntityId,
    /// Time at which the entity acts.
    pub next_action_time: u64,
    /// Tie-break rank of the entity's class.
    pub sequence: u32,
}

impl From<&EntitySnapshot> for TurnEntry {
    fn from(snapshot: &EntitySnapshot) -> Self {
        Self {
            entity: snapshot.id,
            next_action_time: snapshot.next_action_time,
            sequence: snapshot.sequence,
        }
    }
}

type Comparator = fn(&TurnEntry, &TurnEntry) -> Ordering;

/// Priority queue of entities awaiting their next action.
#[derive(Debug)]
pub struct TurnScheduler {
    queue: MinQueue<TurnEntry, Comparator>,
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: MinQueue::new(turn_order as Comparator),
        }
    }

    /// Builds a scheduler holding every entity that has not been withdrawn.
    #[must_use]
    pub fn from_entities<'a, I>(entities: I) -> Self
    where
        I: IntoIterator<Item = &'a EntitySnapshot>,
    {
        let mut scheduler = Self::new();
        for snapshot in entities {
            scheduler.requeue(snapshot);
        }
        scheduler
    }

    /// Adds an entry to the turn order.
    pub fn insert(&mut self, entry: TurnEntry) {
        let _handle = self.queue.insert(entry);
    }

    /// Re-inserts an entity after it acted, unless it was withdrawn.
    pub fn requeue(&mut self, snapshot: &EntitySnapshot) {
        if snapshot.is_withdrawn() {
            log::trace!("dropping withdrawn entity {:?}", snapshot.id);
            return;
        }
        self.insert(TurnEntry::from(snapshot));
    }

    /// Removes and returns the entity due to act next.
    pub fn pop_next(&mut self) -> Option<TurnEntry> {
        let entry = self.queue.remove_min()?;
        log::trace!(
            "turn for {:?} at {}",
            entry.entity,
            entry.next_action_time
        );
        Some(entry)
    }

    /// Entry that would be popped next.
    #[must_use]
    pub fn peek(&self) -> Option<&TurnEntry> {
        self.queue.peek()
    }

    /// Number of scheduled entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether no entity is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

fn turn_order(left: &TurnEntry, right: &TurnEntry) -> Ordering {
    left.next_action_time
        .cmp(&right.next_action_time)
        .then(left.sequence.cmp(&right.sequence))
        .then(left.entity.cmp(&right.entity))
}
