use crossbeam::channel::{Receiver, Sender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::NoteEvent;
use crate::frame::{MAX_RELAYS, RelayMask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRelayEvent {
    pub relay: u8,
    pub active: bool,
}

/// Folds note events into one relay mask per aggregation cycle.
///
/// `enqueue` is called from the reader thread and `drain_and_build_mask`
/// from the aggregation thread; the queue between them is unbounded.
pub struct RelayAggregator {
    relay_count: u8,
    queue_tx: Sender<PendingRelayEvent>,
    queue_rx: Receiver<PendingRelayEvent>,
    held_notes: HeldNotes,
}

impl RelayAggregator {
    pub fn new(relay_count: u8) -> Self {
        let (queue_tx, queue_rx) = crossbeam::channel::unbounded();
        Self {
            relay_count: relay_count.clamp(1, MAX_RELAYS),
            queue_tx,
            queue_rx,
            held_notes: HeldNotes::default(),
        }
    }

    pub fn enqueue(&self, note: NoteEvent) {
        let event = PendingRelayEvent {
            relay: note.pitch % self.relay_count,
            active: note.active,
        };
        // Both ends live in self, so the channel cannot be disconnected.
        let _ = self.queue_tx.send(event);
        self.held_notes.record(note);
    }

    /// Fixes the drain point: the returned iterator yields exactly the items
    /// queued before this call. Anything enqueued afterwards stays queued.
    pub fn begin_drain(&self) -> RelayDrain<'_> {
        RelayDrain {
            queue: &self.queue_rx,
            remaining: self.queue_rx.len(),
        }
    }

    pub fn drain_and_build_mask(&self) -> RelayMask {
        let mut mask = RelayMask::empty(self.relay_count);
        for event in self.begin_drain() {
            if event.active {
                mask.set(event.relay);
            }
        }
        mask
    }

    pub fn pending(&self) -> usize {
        self.queue_rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue_rx.is_empty()
    }

    pub fn relay_count(&self) -> u8 {
        self.relay_count
    }

    /// Last known on/off per pitch. Never read back into the mask.
    pub fn held_notes(&self) -> HashMap<u8, bool> {
        self.held_notes.snapshot()
    }
}

/// Items of one aggregation cycle, counted at the drain point.
pub struct RelayDrain<'a> {
    queue: &'a Receiver<PendingRelayEvent>,
    remaining: usize,
}

impl RelayDrain<'_> {
    pub fn snapshot_len(&self) -> usize {
        self.remaining
    }
}

impl Iterator for RelayDrain<'_> {
    type Item = PendingRelayEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.queue.try_recv().ok()
    }
}

// One bit per pitch. Only the reader writes, so relaxed atomics are enough
// and enqueue never waits on a `held_notes()` caller.
#[derive(Default)]
struct HeldNotes {
    seen: [AtomicU64; 4],
    active: [AtomicU64; 4],
}

impl HeldNotes {
    fn record(&self, note: NoteEvent) {
        let (word, bit) = (note.pitch as usize / 64, 1u64 << (note.pitch % 64));
        self.seen[word].fetch_or(bit, Ordering::Relaxed);
        if note.active {
            self.active[word].fetch_or(bit, Ordering::Relaxed);
        } else {
            self.active[word].fetch_and(!bit, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> HashMap<u8, bool> {
        (0..=u8::MAX)
            .filter_map(|pitch| {
                let (word, bit) = (pitch as usize / 64, 1u64 << (pitch % 64));
                let seen = self.seen[word].load(Ordering::Relaxed) & bit != 0;
                let active = self.active[word].load(Ordering::Relaxed) & bit != 0;
                seen.then_some((pitch, active))
            })
            .collect()
    }
}
