use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};

use crate::error::BuildError;
use crate::host::IndexStorage;
use crate::registry::Registry;
use crate::IndexId;

/// Immutable snapshot of registration state plus the lookups storage needs.
///
/// Built once per coordinator cycle; readers only ever see it complete.
#[derive(Debug)]
pub struct IndexConfiguration {
	registry: Arc<Registry>,
	versions: FxHashMap<IndexId, u32>,
	fingerprint: u64,
}

impl IndexConfiguration {
	/// Opens storage for every registered index and derives the lookup tables.
	pub fn assemble(registry: Arc<Registry>, storage: &dyn IndexStorage) -> Result<Self, BuildError> {
		let mut versions = FxHashMap::default();
		for descriptor in registry.descriptors() {
			storage.open_index(descriptor).map_err(|source| BuildError::Storage {
				index: descriptor.id(),
				source,
			})?;
			versions.insert(descriptor.id(), descriptor.version());
		}

		let fingerprint = fingerprint(&versions);
		Ok(Self {
			registry,
			versions,
			fingerprint,
		})
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	/// Registered ids in registration order.
	pub fn index_ids(&self) -> impl Iterator<Item = IndexId> + '_ {
		self.registry.ids()
	}

	pub fn contains(&self, id: IndexId) -> bool {
		self.versions.contains_key(&id)
	}

	pub fn version(&self, id: IndexId) -> Option<u32> {
		self.versions.get(&id).copied()
	}

	/// Order-independent hash of every `(name, version)` pair.
	///
	/// Storage compares it with the value recorded on disk to detect a
	/// changed index set.
	pub fn fingerprint(&self) -> u64 {
		self.fingerprint
	}
}

fn fingerprint(versions: &FxHashMap<IndexId, u32>) -> u64 {
	let mut entries: Vec<_> = versions.iter().map(|(id, version)| (id.name(), *version)).collect();
	entries.sort_unstable();
	let mut hasher = FxHasher::default();
	entries.hash(&mut hasher);
	hasher.finish()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::RegistryBuilder;
	use crate::test_support::RecordingStorage;
	use crate::{IndexDescriptor, IndexingSettings};

	fn registry(descriptors: Vec<IndexDescriptor>, storage: &Arc<RecordingStorage>) -> Arc<Registry> {
		let mut builder = RegistryBuilder::new(&IndexingSettings::default(), storage.clone());
		for descriptor in descriptors {
			builder.register(descriptor).unwrap();
		}
		Arc::new(builder.finish())
	}

	#[test]
	fn opens_every_index_and_records_versions() {
		let storage = Arc::new(RecordingStorage::default());
		let words = IndexId::create("configuration-test.words");
		let names = IndexId::create("configuration-test.names");
		let registry = registry(
			vec![
				IndexDescriptor::new(words).with_version(3),
				IndexDescriptor::new(names).with_content_dependent(false),
			],
			&storage,
		);

		let config = IndexConfiguration::assemble(registry, storage.as_ref()).unwrap();
		assert_eq!(config.version(words), Some(3));
		assert_eq!(config.version(names), Some(0));
		assert_eq!(config.index_ids().collect::<Vec<_>>(), vec![words, names]);
		assert_eq!(storage.opened(), vec![words, names]);
	}

	#[test]
	fn fingerprint_tracks_versions_not_order() {
		let storage = Arc::new(RecordingStorage::default());
		let a = IndexId::create("configuration-test.fp-a");
		let b = IndexId::create("configuration-test.fp-b");

		let forward = IndexConfiguration::assemble(registry(vec![IndexDescriptor::new(a), IndexDescriptor::new(b)], &storage), storage.as_ref()).unwrap();
		let backward = IndexConfiguration::assemble(registry(vec![IndexDescriptor::new(b), IndexDescriptor::new(a)], &storage), storage.as_ref()).unwrap();
		let bumped =
			IndexConfiguration::assemble(registry(vec![IndexDescriptor::new(a).with_version(1), IndexDescriptor::new(b)], &storage), storage.as_ref()).unwrap();

		assert_eq!(forward.fingerprint(), backward.fingerprint());
		assert_ne!(forward.fingerprint(), bumped.fingerprint());
	}

	#[test]
	fn storage_failure_names_the_index() {
		let storage = Arc::new(RecordingStorage::default());
		let broken = IndexId::create("configuration-test.broken");
		storage.fail_open(broken);

		let err = IndexConfiguration::assemble(registry(vec![IndexDescriptor::new(broken)], &storage), storage.as_ref()).unwrap_err();
		assert!(matches!(err, BuildError::Storage { index, .. } if index == broken));
	}
}
