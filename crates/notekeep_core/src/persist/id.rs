//! Session-local identifier generation.
//!
//! Ids are `<9 random base-36 chars><base-36 millisecond clock>`. The clock
//! part is strictly increasing within a process, so two ids from the same
//! process never share it. Not suitable for security tokens.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

const RANDOM_DIGITS: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static LAST_CLOCK_MS: AtomicI64 = AtomicI64::new(0);

pub fn generate_id() -> String {
    let random = Uuid::new_v4().as_u128() % 36u128.pow(RANDOM_DIGITS as u32);
    let clock = next_clock_ms();

    let mut id = format!("{:0>width$}", to_base36(random), width = RANDOM_DIGITS);
    id.push_str(&to_base36(u128::from(clock.unsigned_abs())));
    id
}

fn next_clock_ms() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_CLOCK_MS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
