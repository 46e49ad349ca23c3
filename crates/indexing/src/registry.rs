//! Registration of indexer descriptors during the startup window.
//!
//! [`RegistryBuilder`] is owned by the configuration build and consumed by
//! [`RegistryBuilder::finish`]; the resulting [`Registry`] is immutable and
//! shared by every reader through an `Arc`.
//!
//! # Invariants
//!
//! - Every registered id is in exactly one of the content-dependent and
//!   not-content-dependent sets.
//! - The directories list is a subset of the not-content-dependent set.
//! - Only content-dependent indexes own an update task.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::BuildError;
use crate::host::IndexStorage;
use crate::update::DocumentUpdateTask;
use crate::{FileType, IndexDescriptor, IndexId, IndexingSettings};

/// Frozen registration state.
#[derive(Debug)]
pub struct Registry {
	descriptors: Vec<IndexDescriptor>,
	positions: FxHashMap<IndexId, usize>,
	requiring_content: FxHashSet<IndexId>,
	not_requiring_content: FxHashSet<IndexId>,
	for_directories: Vec<IndexId>,
	no_limit_check_types: FxHashSet<FileType>,
	update_tasks: FxHashMap<IndexId, DocumentUpdateTask>,
}

impl Registry {
	/// Descriptors in registration order.
	pub fn descriptors(&self) -> &[IndexDescriptor] {
		&self.descriptors
	}

	pub fn descriptor(&self, id: IndexId) -> Option<&IndexDescriptor> {
		self.positions.get(&id).map(|&pos| &self.descriptors[pos])
	}

	/// Registered ids in registration order.
	pub fn ids(&self) -> impl Iterator<Item = IndexId> + '_ {
		self.descriptors.iter().map(IndexDescriptor::id)
	}

	pub fn contains(&self, id: IndexId) -> bool {
		self.positions.contains_key(&id)
	}

	pub fn is_content_dependent(&self, id: IndexId) -> bool {
		self.requiring_content.contains(&id)
	}

	pub fn requiring_content_indices(&self) -> &FxHashSet<IndexId> {
		&self.requiring_content
	}

	pub fn not_requiring_content_indices(&self) -> &FxHashSet<IndexId> {
		&self.not_requiring_content
	}

	/// Metadata indexes that are also offered directories, in registration order.
	pub fn indices_for_directories(&self) -> &[IndexId] {
		&self.for_directories
	}

	/// File types at least one indexer processes regardless of size.
	pub fn no_limit_check_file_types(&self) -> &FxHashSet<FileType> {
		&self.no_limit_check_types
	}

	/// Update task of a content-dependent index; `None` for any other id.
	pub fn update_task(&self, id: IndexId) -> Option<&DocumentUpdateTask> {
		self.update_tasks.get(&id)
	}

	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}

/// Accumulates descriptors during the configuration build.
pub struct RegistryBuilder {
	skip_superseded_filename_index: bool,
	storage: Arc<dyn IndexStorage>,
	registry: Registry,
}

impl RegistryBuilder {
	pub fn new(settings: &IndexingSettings, storage: Arc<dyn IndexStorage>) -> Self {
		Self {
			skip_superseded_filename_index: settings.skip_superseded_filename_index,
			storage,
			registry: Registry {
				descriptors: Vec::new(),
				positions: FxHashMap::default(),
				requiring_content: FxHashSet::default(),
				not_requiring_content: FxHashSet::default(),
				for_directories: Vec::new(),
				no_limit_check_types: FxHashSet::default(),
				update_tasks: FxHashMap::default(),
			},
		}
	}

	/// Records one descriptor.
	pub fn register(&mut self, descriptor: IndexDescriptor) -> Result<(), BuildError> {
		let id = descriptor.id();
		if self.skip_superseded_filename_index && id == IndexId::filename() {
			tracing::debug!(index = %id, "index.register.skip_superseded");
			return Ok(());
		}
		if self.registry.contains(id) {
			return Err(BuildError::DuplicateIndex { index: id });
		}

		let reg = &mut self.registry;
		if descriptor.is_content_dependent() {
			if descriptor.indexes_directories() {
				tracing::warn!(index = %id, "content-dependent index cannot index directories; flag ignored");
			}
			reg.update_tasks.insert(id, DocumentUpdateTask::new(id, Arc::clone(&self.storage)));
			reg.requiring_content.insert(id);
		} else {
			if descriptor.indexes_directories() {
				reg.for_directories.push(id);
			}
			reg.not_requiring_content.insert(id);
		}
		reg.no_limit_check_types.extend(descriptor.size_limit_exempt().iter().cloned());

		tracing::debug!(
			index = %id,
			content_dependent = descriptor.is_content_dependent(),
			directories = descriptor.indexes_directories(),
			"index.register"
		);
		reg.positions.insert(id, reg.descriptors.len());
		reg.descriptors.push(descriptor);
		Ok(())
	}

	pub fn finish(self) -> Registry {
		self.registry
	}
}

#[cfg(test)]
mod tests;
