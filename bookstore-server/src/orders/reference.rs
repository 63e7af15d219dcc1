//! Human-readable order references
//!
//! Format: `ORD{unix millis}{4-digit suffix}`, e.g. `ORD17099999999991234`.
//! Uniqueness is enforced by the store's unique index; callers retry on a
//! duplicate (see [`MAX_REFERENCE_ATTEMPTS`]).

use rand::Rng;

pub const REFERENCE_PREFIX: &str = "ORD";

/// Insert attempts before giving up on a free reference
pub const MAX_REFERENCE_ATTEMPTS: u32 = 8;

pub fn generate_order_ref() -> String {
    let millis = shared::util::now_millis();
    let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
    format!("{REFERENCE_PREFIX}{millis}{suffix}")
}
