//! The depth pile (spec §4.3): a bounded FIFO of not-yet-exhausted fixes
//! with a round-robin retrieval policy, so a long burst history doesn't
//! starve older entries of airtime.
//!
//! Ported field-for-field from `argos_tx_service.hpp`'s `ArgosDepthPile<T>`
//! template (`store`/`eligible`/`retrieve_latest`/`retrieve`). The two
//! bound checks added to `retrieve`'s second loop (see the comment there)
//! are the one deviation from the original, needed because Rust indexing
//! panics on an out-of-range access where C++'s unsigned-integer
//! arithmetic would merely wrap.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// A burst counter of this value means "retransmit forever": spec §4.3's
/// "0 means infinite" is resolved one level up, at the call site that seeds
/// a depth pile entry — `ArgosDepthPile::store` itself treats any nonzero
/// counter identically, exactly as the original template does, so a
/// configured `ntry_per_message == 0` is translated to this sentinel before
/// the fix is stored rather than taught to the pile as a special case.
pub const BURST_COUNTER_INFINITE: u32 = u32::MAX;

struct Entry<T> {
    burst_counter: u32,
    data: T,
}

/// Default capacity, matching `ArgosDepthPile`'s own default constructor
/// argument.
pub const DEFAULT_MAX_SIZE: usize = 24;

/// A fixed-capacity FIFO of fixes awaiting transmission, each carrying its
/// own remaining burst count.
pub struct DepthPile<T> {
    entries: VecDeque<Entry<T>>,
    max_size: usize,
    retrieve_index: u32,
}

impl<T> DepthPile<T> {
    pub fn new(max_size: usize) -> Self {
        DepthPile {
            entries: VecDeque::new(),
            max_size,
            retrieve_index: 0,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends a fix with the given burst count, evicting the oldest entry
    /// if the pile is at capacity.
    pub fn store(&mut self, data: T, burst_count: u32) {
        self.entries.push_back(Entry {
            burst_counter: burst_count,
            data,
        });
        if self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of entries with a nonzero burst counter remaining.
    pub fn eligible(&self) -> usize {
        self.entries.iter().filter(|e| e.burst_counter != 0).count()
    }
}

impl<T: Copy> DepthPile<T> {
    /// The most recently stored fix, if it still has bursts remaining.
    pub fn retrieve_latest(&self) -> Vec<T> {
        let mut v = Vec::new();
        if let Some(last) = self.entries.back() {
            if last.burst_counter != 0 {
                v.push(last.data);
            }
        }
        v
    }

    /// Round-robin retrieval across windows of `max_messages` entries drawn
    /// from the most recent `depth` stored fixes: walk forward through the
    /// windows (wrapping via `retrieve_index % max_index`) until one window
    /// has at least one entry with a nonzero burst counter, then either
    /// return that single entry (decrementing it) or, if several entries in
    /// the window are eligible, return and decrement the whole window.
    pub fn retrieve(&mut self, depth: u32, max_messages: u32) -> Vec<T> {
        let max_messages = depth.min(max_messages).max(1);
        let max_index = (depth + (max_messages - 1)) / max_messages;
        let span = max_messages.min(self.entries.len() as u32);
        let mut result = Vec::new();

        if max_index == 0 || span == 0 {
            return result;
        }

        let max_msg_index = self.retrieve_index + max_index;
        let mut retrieve_index = 0u32;
        let mut eligible_count = 0u32;
        let mut first_eligible: Option<usize> = None;

        while self.retrieve_index < max_msg_index && eligible_count == 0 {
            retrieve_index = self.retrieve_index % max_index;
            for k in 0..span {
                if let Some(idx) = window_index(self.entries.len(), span, retrieve_index, k) {
                    if self.entries[idx].burst_counter != 0 {
                        eligible_count += 1;
                        if first_eligible.is_none() {
                            first_eligible = Some(idx);
                        }
                    }
                }
            }
            self.retrieve_index += 1;
        }

        if eligible_count == 1 {
            let idx = first_eligible.expect("eligible_count == 1 implies a recorded index");
            self.entries[idx].burst_counter -= 1;
            result.push(self.entries[idx].data);
        } else if eligible_count > 1 {
            for k in 0..span {
                if let Some(idx) = window_index(self.entries.len(), span, retrieve_index, k) {
                    if self.entries[idx].burst_counter != 0 {
                        self.entries[idx].burst_counter -= 1;
                    }
                    result.push(self.entries[idx].data);
                }
            }
        }

        result
    }
}

/// `len - span * (window + 1) + k`, bounds-checked (the original computes
/// this in unsigned arithmetic, where an out-of-range window wraps instead
/// of panicking).
fn window_index(len: usize, span: u32, window: u32, k: u32) -> Option<usize> {
    let base = span as i64 * (window as i64 + 1);
    let idx = len as i64 - base + k as i64;
    if idx >= 0 && (idx as usize) < len {
        Some(idx as usize)
    } else {
        None
    }
}
