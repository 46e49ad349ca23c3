//! Interned index identifiers and file-type tags.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Name of the built-in filename index.
pub const FILENAME_INDEX_NAME: &str = "filenames";

#[derive(Default)]
struct IdTable {
	by_name: FxHashMap<Arc<str>, NonZeroU32>,
	names: Vec<Arc<str>>,
}

static IDS: LazyLock<RwLock<IdTable>> = LazyLock::new(|| RwLock::new(IdTable::default()));

/// Process-wide identifier of one indexer.
///
/// Ids are interned by name: creating the same name twice yields the same id,
/// and an id is never handed out for a different name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexId(NonZeroU32);

impl IndexId {
	/// Returns the id for `name`, allocating it on first use.
	pub fn create(name: &str) -> Self {
		if let Some(id) = Self::find(name) {
			return id;
		}

		let mut table = IDS.write();
		if let Some(&raw) = table.by_name.get(name) {
			return Self(raw);
		}
		let next = u32::try_from(table.names.len() + 1).ok().and_then(NonZeroU32::new);
		let Some(raw) = next else {
			panic!("index id space exhausted");
		};
		let name: Arc<str> = Arc::from(name);
		table.names.push(Arc::clone(&name));
		table.by_name.insert(name, raw);
		Self(raw)
	}

	/// Looks up an already created id.
	pub fn find(name: &str) -> Option<Self> {
		IDS.read().by_name.get(name).copied().map(Self)
	}

	/// The built-in filename index.
	pub fn filename() -> Self {
		Self::create(FILENAME_INDEX_NAME)
	}

	/// Returns the name this id was created from.
	pub fn name(self) -> Arc<str> {
		let table = IDS.read();
		Arc::clone(&table.names[self.0.get() as usize - 1])
	}
}

impl fmt::Debug for IndexId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "IndexId({}#{})", self.name(), self.0)
	}
}

impl fmt::Display for IndexId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name())
	}
}

/// Opaque file-type tag supplied by the file model.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileType(Arc<str>);

impl FileType {
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self(name.into())
	}

	pub fn name(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "FileType({})", self.0)
	}
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_name_yields_same_id() {
		let a = IndexId::create("id-test.words");
		let b = IndexId::create("id-test.words");
		assert_eq!(a, b);
		assert_eq!(&*a.name(), "id-test.words");
	}

	#[test]
	fn distinct_names_never_share_ids() {
		let a = IndexId::create("id-test.alpha");
		let b = IndexId::create("id-test.beta");
		assert_ne!(a, b);
		assert_eq!(IndexId::find("id-test.beta"), Some(b));
		assert_eq!(IndexId::find("id-test.never-created"), None);
	}

	#[test]
	fn filename_index_is_well_known() {
		assert_eq!(IndexId::filename(), IndexId::create(FILENAME_INDEX_NAME));
		assert_eq!(IndexId::filename().to_string(), FILENAME_INDEX_NAME);
	}
}
