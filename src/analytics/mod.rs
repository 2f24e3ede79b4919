//! Derived read views
//!
//! Computed from row objects on demand; nothing here touches the store.

pub mod amount;
pub mod date;
pub mod landed;
pub mod summary;

pub use landed::{landed_cost, LandedCost};
pub use summary::{summarize, PaymentSummary};
