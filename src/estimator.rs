//! Cardinality estimate with the standard HyperLogLog small- and
//! large-range corrections, backed by the precomputed lookup tables in
//! `constants`.

use crate::constants::{
    alpha_m_squared, min_num_register_lookup, num_zero_lookup, register_contribution, NUM_BUCKETS,
};
use crate::register_store::RegisterStore;

const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Compute the cardinality estimate for the given register store.
pub fn estimate(store: &RegisterStore<'_>) -> f64 {
    let offset = store.register_offset();
    let overflow_value = store.max_overflow_value();
    let overflow_register = store.max_overflow_register();

    let min_table = min_num_register_lookup(offset);
    let zero_table = num_zero_lookup();

    let mut sum = 0.0f64;
    let mut zero_count = 0u32;

    for (byte_index, &byte) in store.payload().iter().enumerate() {
        sum += min_table[byte as usize];
        zero_count += u32::from(zero_table[byte as usize]);

        if overflow_value != 0 {
            let bucket = (byte_index as u16) * 2;
            if bucket == overflow_register || bucket + 1 == overflow_register {
                // The overflow register's true value is max(nibble + offset,
                // maxOverflowValue): the overflow slot only records the
                // largest position ever seen for this bucket, but a later
                // in-window write (possible after registerOffset has risen
                // via rebase) can exceed a stale overflow value. Contribution
                // to Z is 2^-value, which is a decreasing function of the
                // true value, so taking max(v_i, maxOverflowValue) in
                // position space means taking the smaller of the two
                // candidate 2^-x contributions.
                let nibble = if overflow_register % 2 == 0 {
                    byte >> 4
                } else {
                    byte & 0x0F
                };
                let nibble_was_zero = nibble == 0;
                let stored_contribution = register_contribution(nibble, offset);
                let overflow_contribution = 2f64.powi(-i32::from(overflow_value));
                sum -= stored_contribution;
                sum += stored_contribution.min(overflow_contribution);
                if nibble_was_zero {
                    zero_count -= 1;
                }
            }
        }
    }

    let raw = alpha_m_squared() / sum;
    let m = NUM_BUCKETS as f64;

    if raw <= 2.5 * m {
        if zero_count == 0 {
            raw
        } else {
            m * (m / f64::from(zero_count)).ln()
        }
    } else if raw > TWO_POW_64 / 30.0 {
        let ratio = raw / TWO_POW_64;
        if ratio >= 1.0 {
            f64::MAX
        } else {
            -TWO_POW_64 * (1.0 - ratio).ln()
        }
    } else {
        raw
    }
}
