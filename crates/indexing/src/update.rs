//! Per-index update tasks for unsaved documents.

use std::sync::Arc;
use std::time::Duration;

use lode_worker::Cancelled;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;

use crate::host::IndexStorage;
use crate::{DocumentId, IndexId, UnsavedDocument};

#[derive(Default)]
struct InFlight {
	/// Documents being indexed, with the stamp of the pass in progress.
	stamps: Mutex<FxHashMap<DocumentId, u64>>,
	finished: Condvar,
}

/// Re-indexes unsaved documents against one content-dependent index.
///
/// Tasks run synchronously on the calling thread. Clones share the set of
/// documents currently being indexed, so two threads never index the same
/// document for the same index at once.
#[derive(Clone)]
pub struct DocumentUpdateTask {
	index: IndexId,
	storage: Arc<dyn IndexStorage>,
	in_flight: Arc<InFlight>,
}

impl DocumentUpdateTask {
	pub(crate) fn new(index: IndexId, storage: Arc<dyn IndexStorage>) -> Self {
		Self {
			index,
			storage,
			in_flight: Arc::default(),
		}
	}

	pub fn index(&self) -> IndexId {
		self.index
	}

	/// Re-indexes one document.
	pub fn process(&self, document: &UnsavedDocument) {
		tracing::trace!(index = %self.index, document = document.id().0, stamp = document.stamp(), "index.unsaved.process");
		self.storage.index_unsaved_document(self.index, document);
	}

	/// Re-indexes a batch of documents.
	///
	/// A document another thread is already indexing is waited for. It is
	/// indexed again afterwards unless that pass covered a stamp at least as
	/// new as ours, so on return every document in `documents` is reflected
	/// at its own stamp or a newer one.
	pub fn process_all(&self, documents: &[UnsavedDocument], cancel: &CancellationToken, poll: Duration) -> Result<(), Cancelled> {
		let mut busy = Vec::new();
		for document in documents {
			if cancel.is_cancelled() {
				return Err(Cancelled);
			}
			match self.claim(document) {
				Ok(_claim) => self.process(document),
				Err(covered) => busy.push((document, covered)),
			}
		}

		while !busy.is_empty() {
			let mut ready = Vec::new();
			{
				let mut stamps = self.in_flight.stamps.lock();
				busy.retain_mut(|(document, covered)| match stamps.get(&document.id()) {
					Some(&stamp) => {
						*covered = (*covered).max(stamp);
						true
					}
					None => {
						if *covered < document.stamp() {
							stamps.insert(document.id(), document.stamp());
							ready.push(*document);
						}
						false
					}
				});
				if ready.is_empty() {
					if busy.is_empty() {
						break;
					}
					if cancel.is_cancelled() {
						return Err(Cancelled);
					}
					self.in_flight.finished.wait_for(&mut stamps, poll);
					continue;
				}
			}

			let claims: Vec<_> = ready.into_iter().map(|document| Claim { task: self, document }).collect();
			for claim in &claims {
				self.process(claim.document);
			}
		}
		Ok(())
	}

	/// Claims `document`, or returns the stamp of the pass already holding it.
	fn claim<'a>(&'a self, document: &'a UnsavedDocument) -> Result<Claim<'a>, u64> {
		let mut stamps = self.in_flight.stamps.lock();
		if let Some(&stamp) = stamps.get(&document.id()) {
			return Err(stamp);
		}
		stamps.insert(document.id(), document.stamp());
		Ok(Claim { task: self, document })
	}
}

impl std::fmt::Debug for DocumentUpdateTask {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DocumentUpdateTask").field("index", &self.index).finish_non_exhaustive()
	}
}

/// Releases a claimed document even if the storage engine panics.
struct Claim<'a> {
	task: &'a DocumentUpdateTask,
	document: &'a UnsavedDocument,
}

impl Drop for Claim<'_> {
	fn drop(&mut self) {
		self.task.in_flight.stamps.lock().remove(&self.document.id());
		self.task.in_flight.finished.notify_all();
	}
}
