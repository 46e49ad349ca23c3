//! Seams to the collaborators the coordinator drives but does not own.

use std::sync::Arc;

use crate::error::{ExtensionError, StorageError};
use crate::{FileType, IndexDescriptor, IndexId, IndexingSettings, UnsavedDocument};

/// Storage engine holding index values.
pub trait IndexStorage: Send + Sync + 'static {
	/// Prepares storage for one index while the configuration is assembled.
	fn open_index(&self, descriptor: &IndexDescriptor) -> Result<(), StorageError>;

	/// Re-indexes the in-memory text of `document` for a single index.
	fn index_unsaved_document(&self, index: IndexId, document: &UnsavedDocument);

	/// Drops data keyed by ids that no longer exist.
	fn ensure_stale_ids_deleted(&self);

	/// Brings every loaded index up to date with on-disk changes.
	fn ensure_up_to_date(&self);

	/// Releases storage at process teardown.
	fn dispose(&self) {}
}

/// Extension host supplying indexer definitions.
pub trait ExtensionSource: Send + Sync + 'static {
	fn descriptors(&self) -> Result<Vec<IndexDescriptor>, ExtensionError>;
}

impl ExtensionSource for Vec<IndexDescriptor> {
	fn descriptors(&self) -> Result<Vec<IndexDescriptor>, ExtensionError> {
		Ok(self.clone())
	}
}

/// File-type registry of the file model.
pub trait FileTypeRegistry: Send + Sync + 'static {
	fn registered_file_types(&self) -> Vec<FileType>;
}

impl FileTypeRegistry for Vec<FileType> {
	fn registered_file_types(&self) -> Vec<FileType> {
		self.clone()
	}
}

/// Everything one coordinator cycle needs from the outside world.
#[derive(Clone)]
pub struct IndexingContext {
	pub extensions: Arc<dyn ExtensionSource>,
	pub storage: Arc<dyn IndexStorage>,
	pub file_types: Arc<dyn FileTypeRegistry>,
	pub settings: Arc<IndexingSettings>,
}

impl IndexingContext {
	pub fn new(extensions: Arc<dyn ExtensionSource>, storage: Arc<dyn IndexStorage>, file_types: Arc<dyn FileTypeRegistry>) -> Self {
		Self {
			extensions,
			storage,
			file_types,
			settings: Arc::new(IndexingSettings::default()),
		}
	}

	pub fn with_settings(mut self, settings: IndexingSettings) -> Self {
		self.settings = Arc::new(settings);
		self
	}
}

impl std::fmt::Debug for IndexingContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IndexingContext").field("settings", &self.settings).finish_non_exhaustive()
	}
}
