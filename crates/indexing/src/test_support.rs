//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;

use crate::error::{ExtensionError, StorageError};
use crate::host::{ExtensionSource, IndexStorage, IndexingContext};
use crate::{DocumentId, FileType, IndexDescriptor, IndexId, IndexingSettings, UnsavedDocument};

pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Storage engine that records every call.
#[derive(Default)]
pub(crate) struct RecordingStorage {
	opened: Mutex<Vec<IndexId>>,
	failing: Mutex<FxHashSet<IndexId>>,
	unsaved: Mutex<Vec<(IndexId, DocumentId, u64)>>,
	unsaved_delay: Mutex<Duration>,
	stale_deleted: AtomicUsize,
	up_to_date: AtomicUsize,
	disposed: AtomicUsize,
}

impl RecordingStorage {
	pub fn fail_open(&self, id: IndexId) {
		self.failing.lock().insert(id);
	}

	pub fn slow_unsaved(&self, delay: Duration) {
		*self.unsaved_delay.lock() = delay;
	}

	pub fn opened(&self) -> Vec<IndexId> {
		self.opened.lock().clone()
	}

	pub fn unsaved(&self) -> Vec<(IndexId, DocumentId, u64)> {
		self.unsaved.lock().clone()
	}

	pub fn up_to_date_runs(&self) -> usize {
		self.up_to_date.load(Ordering::SeqCst)
	}

	pub fn stale_deletions(&self) -> usize {
		self.stale_deleted.load(Ordering::SeqCst)
	}

	pub fn disposals(&self) -> usize {
		self.disposed.load(Ordering::SeqCst)
	}
}

impl IndexStorage for RecordingStorage {
	fn open_index(&self, descriptor: &IndexDescriptor) -> Result<(), StorageError> {
		if self.failing.lock().contains(&descriptor.id()) {
			return Err(StorageError::new("corrupted storage"));
		}
		self.opened.lock().push(descriptor.id());
		Ok(())
	}

	fn index_unsaved_document(&self, index: IndexId, document: &UnsavedDocument) {
		let delay = *self.unsaved_delay.lock();
		if !delay.is_zero() {
			std::thread::sleep(delay);
		}
		self.unsaved.lock().push((index, document.id(), document.stamp()));
	}

	fn ensure_stale_ids_deleted(&self) {
		self.stale_deleted.fetch_add(1, Ordering::SeqCst);
	}

	fn ensure_up_to_date(&self) {
		self.up_to_date.fetch_add(1, Ordering::SeqCst);
	}

	fn dispose(&self) {
		self.disposed.fetch_add(1, Ordering::SeqCst);
	}
}

/// Extension host whose descriptor listing can be held back and swapped.
pub(crate) struct GatedExtensions {
	descriptors: Mutex<Result<Vec<IndexDescriptor>, ExtensionError>>,
	open: Mutex<bool>,
	opened: Condvar,
	calls: AtomicUsize,
}

impl GatedExtensions {
	pub fn open(descriptors: Vec<IndexDescriptor>) -> Arc<Self> {
		Self::with_gate(Ok(descriptors), true)
	}

	pub fn closed(descriptors: Vec<IndexDescriptor>) -> Arc<Self> {
		Self::with_gate(Ok(descriptors), false)
	}

	pub fn failing(message: &str) -> Arc<Self> {
		Self::with_gate(Err(ExtensionError::new(message)), true)
	}

	fn with_gate(descriptors: Result<Vec<IndexDescriptor>, ExtensionError>, open: bool) -> Arc<Self> {
		Arc::new(Self {
			descriptors: Mutex::new(descriptors),
			open: Mutex::new(open),
			opened: Condvar::new(),
			calls: AtomicUsize::new(0),
		})
	}

	pub fn release(&self) {
		*self.open.lock() = true;
		self.opened.notify_all();
	}

	/// Holds back later listings until [`Self::release`].
	pub fn close(&self) {
		*self.open.lock() = false;
	}

	pub fn replace(&self, descriptors: Vec<IndexDescriptor>) {
		*self.descriptors.lock() = Ok(descriptors);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl ExtensionSource for GatedExtensions {
	fn descriptors(&self) -> Result<Vec<IndexDescriptor>, ExtensionError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let mut open = self.open.lock();
		while !*open {
			self.opened.wait(&mut open);
		}
		drop(open);
		self.descriptors.lock().clone()
	}
}

/// Extension host that panics while listing descriptors.
pub(crate) struct PanickingExtensions;

impl ExtensionSource for PanickingExtensions {
	fn descriptors(&self) -> Result<Vec<IndexDescriptor>, ExtensionError> {
		panic!("extension host crashed")
	}
}

pub(crate) fn context(extensions: Arc<dyn ExtensionSource>, storage: Arc<RecordingStorage>, file_types: Vec<FileType>) -> IndexingContext {
	IndexingContext::new(extensions, storage, Arc::new(file_types)).with_settings(IndexingSettings {
		await_poll_interval_ms: 2,
		..IndexingSettings::default()
	})
}

/// Token that never fires.
pub(crate) fn never() -> CancellationToken {
	CancellationToken::new()
}

pub(crate) fn rust() -> FileType {
	FileType::new("Rust")
}

pub(crate) fn text() -> FileType {
	FileType::new("PlainText")
}

pub(crate) fn folder() -> FileType {
	FileType::new("Directory")
}
