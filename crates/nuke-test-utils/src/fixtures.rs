//! Sample payload types.
//!
//! - [`Payload`]: mixed-alignment plain-data struct used by tests and benches.
//! - [`DropCounter`]: counts destructor runs through a shared counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Plain data with mixed field alignment, 40 bytes on 64-bit targets.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Payload {
    pub a: u8,
    pub b: i64,
    pub c: u64,
    pub d: (f64, f64),
}

impl Payload {
    pub fn seeded(seed: u64) -> Self {
        Self {
            a: seed as u8,
            b: -(seed as i64),
            c: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15),
            d: (seed as f64, seed as f64 * 0.5),
        }
    }
}

/// Increments a shared counter when dropped.
#[derive(Clone, Debug)]
pub struct DropCounter {
    pub id: usize,
    drops: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new(id: usize, drops: &Arc<AtomicUsize>) -> Self {
        Self {
            id,
            drops: Arc::clone(drops),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
