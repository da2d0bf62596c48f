pub mod atomic_cell;
pub mod in_flight;
pub mod pending;

pub use atomic_cell::AtomicCell;
pub use in_flight::{Claim, InFlight, Join, Lead};
pub use pending::PendingComputation;
