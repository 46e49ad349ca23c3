//! Single-resolution promise shared between background producers and waiters.
//!
//! A [`Promise`] resolves at most once. Waiters may block a plain thread
//! ([`Promise::wait_blocking`]) or await it ([`Promise::wait`]); both remain
//! responsive to a caller-owned [`CancellationToken`] and report
//! cancellation as [`Cancelled`], never as a failure of the producer.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// The caller's cancellation token fired before the promise resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("wait cancelled by caller")]
pub struct Cancelled;

struct Inner<T> {
	slot: Mutex<Option<T>>,
	ready: Condvar,
	notify: Notify,
	done: AtomicBool,
}

/// Clonable handle to a value that becomes available exactly once.
pub struct Promise<T> {
	inner: Arc<Inner<T>>,
}

impl<T> Clone for Promise<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> std::fmt::Debug for Promise<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Promise").field("done", &self.inner.done.load(Ordering::Acquire)).finish()
	}
}

impl<T: Clone> Default for Promise<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Clone> Promise<T> {
	/// Creates an unresolved promise.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Inner {
				slot: Mutex::new(None),
				ready: Condvar::new(),
				notify: Notify::new(),
				done: AtomicBool::new(false),
			}),
		}
	}

	/// Creates a promise that is already resolved to `value`.
	pub fn resolved(value: T) -> Self {
		let promise = Self::new();
		promise.resolve(value);
		promise
	}

	/// Resolves the promise, waking every waiter.
	///
	/// Returns `false` (dropping `value`) when the promise was already resolved.
	pub fn resolve(&self, value: T) -> bool {
		{
			let mut slot = self.inner.slot.lock();
			if slot.is_some() {
				return false;
			}
			*slot = Some(value);
			self.inner.done.store(true, Ordering::Release);
		}
		self.inner.ready.notify_all();
		self.inner.notify.notify_waiters();
		true
	}

	/// Returns true once the promise has been resolved.
	pub fn is_done(&self) -> bool {
		self.inner.done.load(Ordering::Acquire)
	}

	/// Returns the resolved value without waiting.
	pub fn try_get(&self) -> Option<T> {
		self.inner.slot.lock().clone()
	}

	/// Blocks the calling thread until the promise resolves or `cancel` fires.
	///
	/// Cancellation is observed at least every `poll` interval. A resolved
	/// value wins over a concurrently fired token.
	pub fn wait_blocking(&self, cancel: &CancellationToken, poll: Duration) -> Result<T, Cancelled> {
		let mut slot = self.inner.slot.lock();
		loop {
			if let Some(value) = slot.as_ref() {
				return Ok(value.clone());
			}
			if cancel.is_cancelled() {
				return Err(Cancelled);
			}
			self.inner.ready.wait_for(&mut slot, poll);
		}
	}

	/// Waits asynchronously until the promise resolves or `cancel` fires.
	pub async fn wait(&self, cancel: &CancellationToken) -> Result<T, Cancelled> {
		tokio::select! {
			biased;
			value = self.until_resolved() => Ok(value),
			() = cancel.cancelled() => Err(Cancelled),
		}
	}

	async fn until_resolved(&self) -> T {
		loop {
			let mut notified = pin!(self.inner.notify.notified());
			notified.as_mut().enable();
			if let Some(value) = self.try_get() {
				return value;
			}
			notified.await;
		}
	}
}
