//! Shared worker primitives for background index work.
//!
//! Everything that leaves the caller's thread goes through this crate:
//! classified blocking tasks ([`spawn_blocking`]), per-cycle cancellation
//! ([`CycleToken`]), single-resolution results ([`Promise`]) and panic
//! capture ([`catch_panic`]).

mod class;
mod cycle;
mod panic;
mod promise;
mod spawn;

pub use class::TaskClass;
pub use cycle::{CycleClock, CycleToken};
pub use panic::{TaskPanicked, catch_panic};
pub use promise::{Cancelled, Promise};
pub use spawn::spawn_blocking;
