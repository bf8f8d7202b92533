//! Property-based test generators using proptest.
//!
//! Strategies produce row lines in cache-file token form, ready for
//! [`CacheFileBuilder::section`](crate::CacheFileBuilder::section) or
//! `RawSection::push_line`.

use awcache_codec::Timestamp;
use proptest::prelude::*;

/// Upper bound for generated counters, low enough that summing two stays
/// inside the 32-bit range the decoder accepts.
///
/// [`large_counter_rows_strategy`] covers the range above it.
pub const MAX_COUNTER: i64 = (i32::MAX / 2) as i64;

/// Strategy for 14-digit timestamp tokens with valid calendar fields.
pub fn datetime_token_strategy() -> impl Strategy<Value = String> {
    (1990..=2030i32, 1..=12u32, 1..=28u32, 0..24u32, 0..60u32, 0..60u32).prop_map(
        |(y, mo, d, h, mi, s)| format!("{y:04}{mo:02}{d:02}{h:02}{mi:02}{s:02}"),
    )
}

/// Strategy for any valid timestamp token: `0`, 8 digits or 14 digits.
pub fn timestamp_token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just("0".to_string()),
        2 => (1990..=2030i32, 1..=12u32, 1..=28u32)
            .prop_map(|(y, m, d)| format!("{y:04}{m:02}{d:02}")),
        4 => datetime_token_strategy(),
    ]
}

/// Strategy for decoded timestamps.
pub fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
    timestamp_token_strategy()
        .prop_map(|token| Timestamp::parse(&token).expect("generated token is valid"))
}

/// Strategy for counter values.
pub fn counter_strategy() -> impl Strategy<Value = i64> {
    0..=MAX_COUNTER
}

/// Strategy for single-token row keys.
pub fn row_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9.]{0,12}").expect("Invalid regex")
}

/// Strategy for rows of a single-counter section such as `os`.
///
/// Keys are unique and in arbitrary order.
pub fn counter_rows_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_map(row_key_strategy(), counter_strategy(), 0..16)
        .prop_map(|rows| rows.into_iter().map(|(k, v)| format!("{k} {v}")).collect())
        .prop_shuffle()
}

/// Strategy for rows of a single-counter section with values between
/// [`MAX_COUNTER`] and `i32::MAX`, so sums of two may or may not fit.
pub fn large_counter_rows_strategy() -> impl Strategy<Value = Vec<String>> {
    let counter = MAX_COUNTER..=i64::from(i32::MAX);
    prop::collection::btree_map("[a-d]", counter, 0..4)
        .prop_map(|rows| rows.into_iter().map(|(k, v)| format!("{k} {v}")).collect())
}

/// Strategy for rows of the `time` section: a subset of hours, shuffled.
pub fn hour_rows_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_map(0..24u32, prop::array::uniform6(0..=MAX_COUNTER / 4), 0..24)
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(hour, [p, h, b, np, nh, nb])| format!("{hour} {p} {h} {b} {np} {nh} {nb}"))
                .collect()
        })
        .prop_shuffle()
}
