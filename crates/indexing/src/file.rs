use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::FileType;

/// File descriptor handed in by the file model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
	path: PathBuf,
	file_type: FileType,
	directory: bool,
	length: u64,
}

impl IndexedFile {
	/// Describes a regular file of `length` bytes.
	pub fn file(path: impl Into<PathBuf>, file_type: FileType, length: u64) -> Self {
		Self {
			path: path.into(),
			file_type,
			directory: false,
			length,
		}
	}

	/// Describes a directory.
	pub fn directory(path: impl Into<PathBuf>, file_type: FileType) -> Self {
		Self {
			path: path.into(),
			file_type,
			directory: true,
			length: 0,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn file_type(&self) -> &FileType {
		&self.file_type
	}

	pub fn is_directory(&self) -> bool {
		self.directory
	}

	pub fn length(&self) -> u64 {
		self.length
	}
}

/// Identity of an open document, stable across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// In-memory edited version of a file that has not been written to disk.
#[derive(Debug, Clone)]
pub struct UnsavedDocument {
	id: DocumentId,
	file: IndexedFile,
	text: Arc<str>,
	stamp: u64,
}

impl UnsavedDocument {
	pub fn new(id: DocumentId, file: IndexedFile, text: impl Into<Arc<str>>, stamp: u64) -> Self {
		Self {
			id,
			file,
			text: text.into(),
			stamp,
		}
	}

	pub fn id(&self) -> DocumentId {
		self.id
	}

	pub fn file(&self) -> &IndexedFile {
		&self.file
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// Modification stamp of the in-memory text.
	pub fn stamp(&self) -> u64 {
		self.stamp
	}
}
