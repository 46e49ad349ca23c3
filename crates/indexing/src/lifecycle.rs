use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use lode_worker::CycleToken;

/// Monotonic progress of one coordinator cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LifecyclePhase {
	Created = 0,
	ExtensionsLoading = 1,
	ExtensionsLoaded = 2,
	Initializing = 3,
	Initialized = 4,
}

impl LifecyclePhase {
	const fn from_u8(raw: u8) -> Self {
		match raw {
			0 => Self::Created,
			1 => Self::ExtensionsLoading,
			2 => Self::ExtensionsLoaded,
			3 => Self::Initializing,
			_ => Self::Initialized,
		}
	}
}

/// Phase tracking plus the exactly-once shutdown guard of one cycle.
///
/// Shutdown is orthogonal to the phase: it can be requested in any phase and
/// background work checks it cooperatively.
#[derive(Debug)]
pub struct Lifecycle {
	phase: AtomicU8,
	shutdown_performed: AtomicBool,
	token: CycleToken,
}

impl Lifecycle {
	pub fn new(generation: u64) -> Self {
		Self {
			phase: AtomicU8::new(LifecyclePhase::Created as u8),
			shutdown_performed: AtomicBool::new(false),
			token: CycleToken::new(generation),
		}
	}

	pub fn phase(&self) -> LifecyclePhase {
		LifecyclePhase::from_u8(self.phase.load(Ordering::Acquire))
	}

	/// Moves forward to `phase`; never moves backwards.
	pub fn advance(&self, phase: LifecyclePhase) -> LifecyclePhase {
		let previous = LifecyclePhase::from_u8(self.phase.fetch_max(phase as u8, Ordering::AcqRel));
		if previous < phase {
			tracing::debug!(generation = self.token.generation(), from = ?previous, to = ?phase, "index.lifecycle.advance");
		}
		previous
	}

	pub fn generation(&self) -> u64 {
		self.token.generation()
	}

	/// Cancelled once shutdown is performed.
	pub fn token(&self) -> &CycleToken {
		&self.token
	}

	/// Claims shutdown. Returns `true` for exactly one caller.
	pub fn perform_shutdown(&self) -> bool {
		let won = self.shutdown_performed.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok();
		if won {
			self.token.cancel();
		}
		won
	}

	/// Runs `body` if this call wins the shutdown claim.
	pub fn run_shutdown(&self, body: impl FnOnce()) -> bool {
		if !self.perform_shutdown() {
			return false;
		}
		body();
		true
	}

	pub fn is_shutdown_requested(&self) -> bool {
		self.shutdown_performed.load(Ordering::Acquire)
	}
}
