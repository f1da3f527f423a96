//! hll-sketch: a mergeable HyperLogLog cardinality sketch with nibble-packed
//! registers, a sliding baseline offset, a single out-of-band overflow
//! register, and sparse/dense on-wire serialization.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod codec;
mod constants;
mod error;
mod estimator;
pub mod hash;
mod merge;
mod register_store;
mod update;
mod validation;

pub use error::{Result, SketchError};

use register_store::RegisterStore;
use update::{apply_coupon, derive_coupon};

/// A HyperLogLog cardinality sketch.
///
/// Construct with [`Sketch::new`], feed it hashed observations with
/// [`Sketch::add`], combine sketches with [`Sketch::fold`], and read the
/// distinct-count estimate with [`Sketch::estimate`]. [`Sketch::to_bytes`]
/// and [`Sketch::parse`] round-trip the sketch through its on-wire form.
#[derive(Debug, Clone)]
pub struct Sketch<'a> {
    store: RegisterStore<'a>,
    cached_estimate: Option<f64>,
}

impl Sketch<'static> {
    /// Create a new, empty sketch.
    #[must_use]
    pub fn new() -> Self {
        Sketch {
            store: RegisterStore::empty(),
            cached_estimate: None,
        }
    }
}

impl Default for Sketch<'static> {
    fn default() -> Self {
        Sketch::new()
    }
}

impl<'a> Sketch<'a> {
    /// Record one observation. `hashed` must be at least 10 bytes; the
    /// trailing two bytes select a bucket and the leading eight bytes are
    /// scanned for their first set bit. Callers without their own hashing
    /// pipeline can use [`hash::hash_bytes`] or [`hash::hash_item`] to
    /// produce a suitable buffer from arbitrary input.
    pub fn add(&mut self, hashed: &[u8]) -> Result<()> {
        let coupon = derive_coupon(hashed)?;
        apply_coupon(&mut self.store, coupon);
        self.cached_estimate = None;
        Ok(())
    }

    /// Merge `other` into `self`, consuming `other`. A no-op if `other` has
    /// never observed anything.
    pub fn fold(self, other: Sketch<'a>) -> Result<Sketch<'a>> {
        let store = merge::fold(self.store, other.store)?;
        Ok(Sketch {
            store,
            cached_estimate: None,
        })
    }

    /// Estimate the number of distinct observations recorded so far.
    /// Cached after the first call; any subsequent `add` or `fold`
    /// invalidates the cache.
    pub fn estimate(&mut self) -> f64 {
        if let Some(cached) = self.cached_estimate {
            return cached;
        }
        let value = estimator::estimate(&self.store);
        self.cached_estimate = Some(value);
        value
    }

    /// Serialize to bytes, choosing the sparse form when occupancy is low
    /// and the dense form otherwise.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::serialize(&self.store)
    }

    /// Parse a sketch from bytes previously produced by [`Sketch::to_bytes`]
    /// (or by a compatible legacy writer using the V0 layout).
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let store = codec::parse(bytes)?;
        Ok(Sketch {
            store,
            cached_estimate: None,
        })
    }

    /// Number of registers that have observed at least one value.
    #[must_use]
    pub fn num_non_zero_registers(&self) -> u16 {
        self.store.num_non_zero_registers()
    }

    /// Read-only access to the dense register payload, for debugging and
    /// introspection. Does not reflect the wire-level sparse/dense choice.
    #[must_use]
    pub fn registers(&self) -> &[u8] {
        self.store.payload()
    }
}
