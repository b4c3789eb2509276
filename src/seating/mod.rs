//! Seat allocation.
//!
//! [`SeatPlanner`] turns one exam date's roster and the venue catalog into
//! a [`SeatPlan`](crate::models::SeatPlan); [`SeatingLedger`] tracks each
//! date's plan through generate, save, and clear.

mod ledger;
mod planner;

pub use ledger::{SeatingLedger, SeatingState};
pub use planner::{SeatPlanner, SeatingRequest};
