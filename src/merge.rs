//! Fold (merge) one sketch's registers into another, across offset skew
//! and sparse/dense representations.

use crate::constants::NUM_BUCKETS;
use crate::error::{Result, SketchError};
use crate::register_store::RegisterStore;
use crate::update::{apply_coupon, rebase, Coupon};

/// Merge `other`'s registers into `self`, consuming `other`.
///
/// `self` ends up as the writable, dense union of both sketches. When
/// `self`'s offset is lower than `other`'s, the two are swapped first so the
/// result never has to decrement an offset.
pub fn fold<'a>(
    mut self_store: RegisterStore<'a>,
    mut other_store: RegisterStore<'a>,
) -> Result<RegisterStore<'a>> {
    if other_store.num_non_zero_registers() == 0 && other_store.max_overflow_value() == 0 {
        return Ok(self_store);
    }

    if self_store.register_offset() < other_store.register_offset() {
        std::mem::swap(&mut self_store, &mut other_store);
    }

    ensure_dense(&mut self_store);
    ensure_dense(&mut other_store);

    if self_store.register_offset() < other_store.register_offset() {
        return Err(SketchError::InvalidState {
            reason: "self.registerOffset < other.registerOffset after swap".to_string(),
        });
    }

    let other_overflow_value = other_store.max_overflow_value();
    if other_overflow_value != 0 {
        apply_coupon(
            &mut self_store,
            Coupon {
                bucket: other_store.max_overflow_register(),
                position_of_one: other_overflow_value,
            },
        );
    }

    // `offset_diff` is recomputed every iteration rather than hoisted above
    // the loop: a single fold can legitimately saturate `numNonZeroRegisters`
    // to NUM_BUCKETS more than once if a mid-merge rebase zeroes out some
    // registers and later source bytes go on to refill exactly those
    // buckets. Each byte is therefore merged against the offset skew as it
    // stands right before that byte is applied, and a saturating merge
    // triggers an immediate rebase (which itself updates `self`'s offset)
    // before the next byte is considered.
    let other_payload: Vec<u8> = other_store.payload().to_vec();

    for (byte_index, &src) in other_payload.iter().enumerate() {
        if src == 0 {
            continue;
        }

        let offset_diff = self_store.register_offset() - other_store.register_offset();
        let dst = self_store.payload()[byte_index];
        let (merged, non_zero_delta) = merge_byte(dst, src, offset_diff);

        if merged != dst {
            self_store.payload_mut()[byte_index] = merged;
        }
        if non_zero_delta != 0 {
            let total = self_store.num_non_zero_registers() + non_zero_delta;
            self_store.set_num_non_zero_registers(total);
        }

        if self_store.num_non_zero_registers() as usize >= NUM_BUCKETS {
            rebase(&mut self_store);
        }
    }

    Ok(self_store)
}

/// Merge one source byte into one destination byte, given the offset skew
/// between them. Uses `i16` arithmetic so a source nibble that sits below
/// the destination's baseline goes negative and is naturally dominated by
/// `max` against the (non-negative) destination nibble. Returns the merged
/// byte and how many of its two nibbles transitioned from zero to non-zero.
fn merge_byte(dst: u8, src: u8, offset_diff: u8) -> (u8, u16) {
    let dst_upper = i16::from(dst >> 4);
    let dst_lower = i16::from(dst & 0x0F);
    let src_upper = i16::from(src >> 4) - i16::from(offset_diff);
    let src_lower = i16::from(src & 0x0F) - i16::from(offset_diff);

    let new_upper = dst_upper.max(src_upper).max(0);
    let new_lower = dst_lower.max(src_lower).max(0);

    let mut non_zero_delta = 0u16;
    if dst_upper == 0 && new_upper != 0 {
        non_zero_delta += 1;
    }
    if dst_lower == 0 && new_lower != 0 {
        non_zero_delta += 1;
    }

    let merged = ((new_upper as u8) << 4) | (new_lower as u8);
    (merged, non_zero_delta)
}

/// Expand a sparse store's conceptual payload into a dense 1024-byte
/// payload in place. Sparse stores in this crate are represented by the
/// codec at parse time as already-dense `RegisterStore`s (see `codec.rs`),
/// so this is a no-op unless a future sparse-in-memory representation is
/// introduced; kept as an explicit step so `fold` stays correct if that
/// changes.
fn ensure_dense(store: &mut RegisterStore<'_>) {
    let _ = store.payload_mut();
}
