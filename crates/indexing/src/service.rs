//! Owner of the current indexing cycle.
//!
//! A cycle started by [`IndexingService::on_extensions_changed`] stays pending
//! until its configuration build has finished. Only then is it promoted to
//! current and the previous cycle shut down, so lookups never observe a cycle
//! without a registry or evaluator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use lode_worker::{Cancelled, CycleClock, TaskClass};
use parking_lot::{Condvar, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::IndexError;
use crate::host::IndexingContext;
use crate::registered::RegisteredIndexes;
use crate::update::DocumentUpdateTask;
use crate::{IndexConfiguration, IndexId, IndexedFile, UnsavedDocument};

/// Cycle slots shared with promotion tasks.
struct Cycles {
	current: ArcSwap<RegisteredIndexes>,
	/// Cycle whose build is still running. Also serializes cycle changes and shutdown.
	pending: Mutex<Option<Arc<RegisteredIndexes>>>,
	settled: Condvar,
}

impl Cycles {
	/// Makes `next` current if it is still the pending cycle.
	fn promote(&self, next: &Arc<RegisteredIndexes>) {
		let mut pending = self.pending.lock();
		if !pending.as_ref().is_some_and(|p| Arc::ptr_eq(p, next)) {
			tracing::debug!(generation = next.generation(), "index.cycle.promote.superseded");
			return;
		}
		*pending = None;
		let previous = self.current.swap(Arc::clone(next));
		previous.perform_shutdown();
		tracing::info!(from = previous.generation(), to = next.generation(), "index cycle replaced");
		drop(pending);
		self.settled.notify_all();
	}
}

/// Holds the current [`RegisteredIndexes`] cycle and swaps it on extension changes.
///
/// Lookups load the current cycle without locking; only cycle replacement
/// and shutdown serialize on the pending slot.
pub struct IndexingService {
	context: IndexingContext,
	clock: CycleClock,
	cycles: Arc<Cycles>,
	shut_down: AtomicBool,
}

impl IndexingService {
	/// Starts the first cycle; its configuration build runs in the background.
	pub fn start(context: IndexingContext) -> Self {
		let clock = CycleClock::new();
		let first = RegisteredIndexes::new(context.clone(), clock.advance());
		tracing::info!(generation = first.generation(), "indexing started");
		Self {
			context,
			clock,
			cycles: Arc::new(Cycles {
				current: ArcSwap::new(first),
				pending: Mutex::new(None),
				settled: Condvar::new(),
			}),
			shut_down: AtomicBool::new(false),
		}
	}

	/// Current cycle, also after shutdown.
	pub fn registered(&self) -> Arc<RegisteredIndexes> {
		self.cycles.current.load_full()
	}

	/// Cycle waiting for its build before it replaces the current one.
	pub fn pending(&self) -> Option<Arc<RegisteredIndexes>> {
		self.cycles.pending.lock().clone()
	}

	fn live(&self) -> Result<Arc<RegisteredIndexes>, IndexError> {
		if self.is_shut_down() {
			return Err(IndexError::ShutDown);
		}
		Ok(self.cycles.current.load_full())
	}

	pub fn configuration(&self, cancel: &CancellationToken) -> Result<Arc<IndexConfiguration>, IndexError> {
		self.live()?.configuration_state(cancel)
	}

	pub fn required_indexes(&self, file: &IndexedFile) -> Result<Vec<IndexId>, IndexError> {
		self.live()?.required_indexes(file)
	}

	/// Update task of a content-dependent index; `Ok(None)` for any other id.
	pub fn update_task_for(&self, id: IndexId) -> Result<Option<DocumentUpdateTask>, IndexError> {
		Ok(self.live()?.unsaved_data_update_task(id))
	}

	/// Re-indexes unsaved documents for `id`; `Ok(false)` when it has no update task.
	pub fn update_unsaved_documents(&self, id: IndexId, documents: &[UnsavedDocument], cancel: &CancellationToken) -> Result<bool, IndexError> {
		self.live()?.index_unsaved_documents(id, documents, cancel)
	}

	pub fn reset_hints(&self) -> Result<(), IndexError> {
		self.live()?.reset_hints();
		Ok(())
	}

	/// Starts a fresh cycle after extensions were loaded or unloaded.
	///
	/// The returned cycle is pending: lookups keep using the current cycle
	/// until the new build has finished, successfully or not. A cycle still
	/// pending from an earlier change is shut down and never promoted.
	pub fn on_extensions_changed(&self) -> Result<Arc<RegisteredIndexes>, IndexError> {
		let mut pending = self.cycles.pending.lock();
		if self.is_shut_down() {
			return Err(IndexError::ShutDown);
		}

		let next = RegisteredIndexes::new(self.context.clone(), self.clock.advance());
		if let Some(superseded) = pending.replace(Arc::clone(&next)) {
			superseded.perform_shutdown();
			tracing::debug!(generation = superseded.generation(), "index.cycle.superseded");
		}
		drop(pending);

		let cycles = Arc::clone(&self.cycles);
		let waiting = Arc::clone(&next);
		lode_worker::spawn_blocking(TaskClass::Background, move || {
			match waiting.configuration_future().wait_blocking(waiting.shutdown_token(), waiting.poll_interval()) {
				Ok(_) => cycles.promote(&waiting),
				Err(Cancelled) => tracing::debug!(generation = waiting.generation(), "index.cycle.abandoned"),
			}
		});
		Ok(next)
	}

	/// Blocks until no cycle is pending and returns the current one.
	pub fn wait_for_pending_cycle(&self, cancel: &CancellationToken) -> Result<Arc<RegisteredIndexes>, IndexError> {
		let poll = self.context.settings.await_poll_interval();
		let mut pending = self.cycles.pending.lock();
		while pending.is_some() {
			if cancel.is_cancelled() {
				return Err(IndexError::from(Cancelled));
			}
			self.cycles.settled.wait_for(&mut pending, poll);
		}
		drop(pending);
		self.live()
	}

	/// Shuts indexing down. Returns `true` for the one call that performed it.
	pub fn shutdown(&self) -> bool {
		let mut pending = self.cycles.pending.lock();
		if self.shut_down.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
			return false;
		}

		if let Some(abandoned) = pending.take() {
			abandoned.perform_shutdown();
		}
		let current = self.cycles.current.load_full();
		current.perform_shutdown();
		self.context.storage.dispose();
		drop(pending);
		self.cycles.settled.notify_all();
		tracing::info!(generation = current.generation(), "indexing shut down");
		true
	}

	pub fn is_shut_down(&self) -> bool {
		self.shut_down.load(Ordering::Acquire)
	}
}

impl std::fmt::Debug for IndexingService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IndexingService")
			.field("current", &self.cycles.current.load_full())
			.field("pending", &self.pending().map(|cycle| cycle.generation()))
			.field("shut_down", &self.is_shut_down())
			.finish_non_exhaustive()
	}
}
