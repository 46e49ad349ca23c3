//! Indexer definitions contributed by extensions.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::{FileType, IndexId, IndexedFile};

/// Per-file acceptance check of an input filter.
pub type FilePredicate = Arc<dyn Fn(&IndexedFile) -> bool + Send + Sync>;

/// Decides which files an indexer is offered.
#[derive(Clone)]
pub enum InputFilter {
	/// Every file.
	Any,
	/// Files of the listed types.
	FileTypes(Arc<FxHashSet<FileType>>),
	/// Files of the listed types that also pass a per-file check.
	FileTypesAnd(Arc<FxHashSet<FileType>>, FilePredicate),
	/// Files passing a per-file check; no file-type prefilter.
	Custom(FilePredicate),
}

/// Outcome of prefiltering an input filter by file type alone.
#[derive(Clone)]
pub(crate) enum Acceptance {
	Always,
	PerFile(FilePredicate),
	Never,
}

impl InputFilter {
	pub fn file_types<I>(types: I) -> Self
	where
		I: IntoIterator<Item = FileType>,
	{
		Self::FileTypes(Arc::new(types.into_iter().collect()))
	}

	pub fn file_types_and<I, F>(types: I, accept: F) -> Self
	where
		I: IntoIterator<Item = FileType>,
		F: Fn(&IndexedFile) -> bool + Send + Sync + 'static,
	{
		Self::FileTypesAnd(Arc::new(types.into_iter().collect()), Arc::new(accept))
	}

	pub fn custom<F>(accept: F) -> Self
	where
		F: Fn(&IndexedFile) -> bool + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(accept))
	}

	/// Full acceptance check for one file.
	pub fn accepts(&self, file: &IndexedFile) -> bool {
		match self.classify(file.file_type()) {
			Acceptance::Always => true,
			Acceptance::PerFile(accept) => accept(file),
			Acceptance::Never => false,
		}
	}

	pub(crate) fn classify(&self, file_type: &FileType) -> Acceptance {
		match self {
			Self::Any => Acceptance::Always,
			Self::FileTypes(types) if types.contains(file_type) => Acceptance::Always,
			Self::FileTypesAnd(types, accept) if types.contains(file_type) => Acceptance::PerFile(Arc::clone(accept)),
			Self::Custom(accept) => Acceptance::PerFile(Arc::clone(accept)),
			Self::FileTypes(_) | Self::FileTypesAnd(..) => Acceptance::Never,
		}
	}
}

impl fmt::Debug for InputFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Any => f.write_str("Any"),
			Self::FileTypes(types) => f.debug_tuple("FileTypes").field(types).finish(),
			Self::FileTypesAnd(types, _) => f.debug_tuple("FileTypesAnd").field(types).field(&"<predicate>").finish(),
			Self::Custom(_) => f.debug_tuple("Custom").field(&"<predicate>").finish(),
		}
	}
}

/// Immutable definition of one indexer.
///
/// Indexers depend on file content unless stated otherwise, mirroring the
/// common case of extracting data from the text of a file.
#[derive(Debug, Clone)]
pub struct IndexDescriptor {
	id: IndexId,
	version: u32,
	content_dependent: bool,
	indexes_directories: bool,
	size_limit_exempt: Vec<FileType>,
	input_filter: InputFilter,
}

impl IndexDescriptor {
	pub fn new(id: IndexId) -> Self {
		Self {
			id,
			version: 0,
			content_dependent: true,
			indexes_directories: false,
			size_limit_exempt: Vec::new(),
			input_filter: InputFilter::Any,
		}
	}

	/// Storage format version; bumping it invalidates stored data.
	pub fn with_version(mut self, version: u32) -> Self {
		self.version = version;
		self
	}

	pub fn with_content_dependent(mut self, content_dependent: bool) -> Self {
		self.content_dependent = content_dependent;
		self
	}

	/// Marks a metadata-only indexer as also indexing directories.
	pub fn with_directories(mut self, indexes_directories: bool) -> Self {
		self.indexes_directories = indexes_directories;
		self
	}

	/// File types this indexer processes regardless of the file size limit.
	pub fn with_size_limit_exempt<I>(mut self, types: I) -> Self
	where
		I: IntoIterator<Item = FileType>,
	{
		self.size_limit_exempt.extend(types);
		self
	}

	pub fn with_input_filter(mut self, filter: InputFilter) -> Self {
		self.input_filter = filter;
		self
	}

	pub fn id(&self) -> IndexId {
		self.id
	}

	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn is_content_dependent(&self) -> bool {
		self.content_dependent
	}

	pub fn indexes_directories(&self) -> bool {
		self.indexes_directories
	}

	pub fn size_limit_exempt(&self) -> &[FileType] {
		&self.size_limit_exempt
	}

	pub fn input_filter(&self) -> &InputFilter {
		&self.input_filter
	}
}
