// src/dag/sequence.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic ID source, injected wherever run IDs are needed.
#[derive(Debug)]
pub struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    /// Start counting after `seed`; the first ID handed out is `seed + 1`.
    pub fn new(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
        }
    }

    /// Seed from the wall clock (milliseconds since the Unix epoch).
    pub fn from_clock() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::new(millis)
    }

    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Most recently issued ID (or the seed if none were issued yet).
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::from_clock()
    }
}
