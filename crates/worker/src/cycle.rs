//! Generation numbering and cancellation for coordinator cycles.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Hands out cycle generations, starting at 1.
#[derive(Debug, Default)]
pub struct CycleClock {
	issued: AtomicU64,
}

impl CycleClock {
	pub const fn new() -> Self {
		Self { issued: AtomicU64::new(0) }
	}

	/// Issues the next generation.
	pub fn advance(&self) -> u64 {
		self.issued.fetch_add(1, Ordering::AcqRel) + 1
	}
}

/// Cancellation scoped to one cycle.
///
/// Background waits of a cycle observe this token; cancelling it leaves
/// every other cycle untouched.
#[derive(Debug, Clone)]
pub struct CycleToken {
	generation: u64,
	cancel: CancellationToken,
}

impl CycleToken {
	pub fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Cancels the cycle. Returns `false` if it was already cancelled.
	pub fn cancel(&self) -> bool {
		if self.cancel.is_cancelled() {
			return false;
		}
		self.cancel.cancel();
		true
	}

	/// Token to hand to [`crate::Promise`] waits.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancel
	}
}
