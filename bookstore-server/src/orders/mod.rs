//! Order lifecycle
//!
//! `Pending -> Paid | Failed`, both terminal. Transitions go through the
//! store's conditional updates so concurrent callers settle on one outcome.

pub mod lifecycle;
pub mod reference;

pub use lifecycle::{OrderLifecycle, PaymentSettings};
pub use reference::generate_order_ref;
