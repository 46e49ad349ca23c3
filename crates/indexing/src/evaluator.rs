//! Decides which indexes must process a given file.
//!
//! An evaluator is derived from one frozen [`Registry`] and never mutated:
//! the coordinator replaces it wholesale when file types or hints change,
//! and lookups already holding the old `Arc` finish against the old state.
//! Candidates are precomputed for the file types known at build time; other
//! types are computed per lookup without caching, so lookups never lock.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::descriptor::{Acceptance, FilePredicate, InputFilter};
use crate::registry::Registry;
use crate::{FileType, IndexId, IndexedFile};

#[derive(Clone)]
struct Candidate {
	id: IndexId,
	content_dependent: bool,
	check: Option<FilePredicate>,
}

/// Indexes that may run for one file type, in registration order.
struct FileTypeIndexes {
	candidates: Vec<Candidate>,
	excluded: Vec<IndexId>,
}

pub struct RequiredIndexesEvaluator {
	registry: Arc<Registry>,
	file_size_limit: u64,
	directories: Vec<(IndexId, InputFilter)>,
	by_file_type: FxHashMap<FileType, FileTypeIndexes>,
}

impl RequiredIndexesEvaluator {
	/// Builds an evaluator, precomputing the given file types.
	pub fn new(registry: Arc<Registry>, file_types: &[FileType], file_size_limit: u64) -> Self {
		let directories = registry
			.indices_for_directories()
			.iter()
			.filter_map(|&id| registry.descriptor(id).map(|d| (id, d.input_filter().clone())))
			.collect();

		let by_file_type = file_types.iter().map(|ft| (ft.clone(), compute_for_file_type(&registry, ft))).collect();

		Self {
			registry,
			file_size_limit,
			directories,
			by_file_type,
		}
	}

	/// Ordered ids of the indexes that must process `file`.
	pub fn required_indexes(&self, file: &IndexedFile) -> Vec<IndexId> {
		if file.is_directory() {
			return self.directories.iter().filter(|(_, filter)| filter.accepts(file)).map(|(id, _)| *id).collect();
		}

		let file_type = file.file_type();
		let too_large = file.length() > self.file_size_limit && !self.registry.no_limit_check_file_types().contains(file_type);
		self.with_file_type(file_type, |entry| {
			entry
				.candidates
				.iter()
				.filter(|c| !(too_large && c.content_dependent))
				.filter(|c| c.check.as_ref().is_none_or(|accept| accept(file)))
				.map(|c| c.id)
				.collect()
		})
	}

	/// Indexes that would run for files of `file_type`, and those excluded by type.
	///
	/// Indexes with a per-file check count as running. Intended for
	/// verification; production lookups go through [`Self::required_indexes`].
	pub fn required_indexes_for_file_type(&self, file_type: &FileType) -> (Vec<IndexId>, Vec<IndexId>) {
		self.with_file_type(file_type, |entry| (entry.candidates.iter().map(|c| c.id).collect(), entry.excluded.clone()))
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	fn with_file_type<R>(&self, file_type: &FileType, f: impl FnOnce(&FileTypeIndexes) -> R) -> R {
		match self.by_file_type.get(file_type) {
			Some(entry) => f(entry),
			None => f(&compute_for_file_type(&self.registry, file_type)),
		}
	}

	/// Whether `file_type` was precomputed when this evaluator was built.
	pub fn is_precomputed(&self, file_type: &FileType) -> bool {
		self.by_file_type.contains_key(file_type)
	}
}

impl std::fmt::Debug for RequiredIndexesEvaluator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RequiredIndexesEvaluator")
			.field("indexes", &self.registry.len())
			.field("file_size_limit", &self.file_size_limit)
			.field("file_types", &self.by_file_type.len())
			.finish_non_exhaustive()
	}
}

fn compute_for_file_type(registry: &Registry, file_type: &FileType) -> FileTypeIndexes {
	let mut candidates = Vec::new();
	let mut excluded = Vec::new();
	for descriptor in registry.descriptors() {
		let check = match descriptor.input_filter().classify(file_type) {
			Acceptance::Always => None,
			Acceptance::PerFile(accept) => Some(accept),
			Acceptance::Never => {
				excluded.push(descriptor.id());
				continue;
			}
		};
		candidates.push(Candidate {
			id: descriptor.id(),
			content_dependent: descriptor.is_content_dependent(),
			check,
		});
	}
	FileTypeIndexes { candidates, excluded }
}
