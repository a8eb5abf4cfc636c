//! Identity layer: session minting/validation and the access gate
//! wrapping every protected operation.

pub mod gate;
pub mod session;

pub use gate::{AccessGate, AuthOutcome};
pub use session::{Resolution, SessionManager};
