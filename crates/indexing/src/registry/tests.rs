use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::{RecordingStorage, rust, text};

fn builder(settings: &IndexingSettings) -> RegistryBuilder {
	RegistryBuilder::new(settings, Arc::new(RecordingStorage::default()))
}

fn sample() -> Vec<IndexDescriptor> {
	vec![
		IndexDescriptor::new(IndexId::create("registry-test.words")),
		IndexDescriptor::new(IndexId::create("registry-test.paths")).with_content_dependent(false).with_directories(true),
		IndexDescriptor::new(IndexId::create("registry-test.stubs")).with_size_limit_exempt([rust()]),
		IndexDescriptor::new(IndexId::create("registry-test.extensions")).with_content_dependent(false),
	]
}

#[test]
fn every_index_lands_in_exactly_one_content_set() {
	let mut builder = builder(&IndexingSettings::default());
	for descriptor in sample() {
		builder.register(descriptor).unwrap();
	}
	let registry = builder.finish();

	assert_eq!(registry.len(), 4);
	for id in registry.ids() {
		let content = registry.requiring_content_indices().contains(&id);
		let metadata = registry.not_requiring_content_indices().contains(&id);
		assert!(content ^ metadata, "{id} must be in exactly one set");
	}
	for id in registry.indices_for_directories() {
		assert!(registry.not_requiring_content_indices().contains(id));
	}
}

#[test]
fn only_content_dependent_indexes_get_update_tasks() {
	let mut builder = builder(&IndexingSettings::default());
	for descriptor in sample() {
		builder.register(descriptor).unwrap();
	}
	let registry = builder.finish();

	let words = IndexId::create("registry-test.words");
	let paths = IndexId::create("registry-test.paths");
	assert_eq!(registry.update_task(words).map(DocumentUpdateTask::index), Some(words));
	assert!(registry.update_task(paths).is_none());
	assert!(registry.update_task(IndexId::create("registry-test.unknown")).is_none());
}

#[test]
fn preserves_registration_order() {
	let mut builder = builder(&IndexingSettings::default());
	let expected: Vec<_> = sample().iter().map(IndexDescriptor::id).collect();
	for descriptor in sample() {
		builder.register(descriptor).unwrap();
	}
	assert_eq!(builder.finish().ids().collect::<Vec<_>>(), expected);
}

#[test]
fn accumulates_size_limit_exempt_types() {
	let mut builder = builder(&IndexingSettings::default());
	builder.register(IndexDescriptor::new(IndexId::create("registry-test.exempt-a")).with_size_limit_exempt([rust()])).unwrap();
	builder.register(IndexDescriptor::new(IndexId::create("registry-test.exempt-b")).with_size_limit_exempt([text(), rust()])).unwrap();
	let registry = builder.finish();

	let exempt = registry.no_limit_check_file_types();
	assert_eq!(exempt.len(), 2);
	assert!(exempt.contains(&rust()) && exempt.contains(&text()));
}

#[test]
fn duplicate_registration_is_a_build_error() {
	let mut builder = builder(&IndexingSettings::default());
	let id = IndexId::create("registry-test.twice");
	builder.register(IndexDescriptor::new(id)).unwrap();
	let err = builder.register(IndexDescriptor::new(id).with_content_dependent(false)).unwrap_err();
	assert!(matches!(err, BuildError::DuplicateIndex { index } if index == id));
}

#[test]
fn superseded_filename_index_is_skipped_when_configured() {
	let filename = || IndexDescriptor::new(IndexId::filename()).with_content_dependent(false).with_directories(true);

	let mut kept = builder(&IndexingSettings::default());
	kept.register(filename()).unwrap();
	let kept = kept.finish();
	assert!(kept.contains(IndexId::filename()));
	assert_eq!(kept.indices_for_directories(), &[IndexId::filename()]);

	let settings = IndexingSettings {
		skip_superseded_filename_index: true,
		..IndexingSettings::default()
	};
	let mut skipped = builder(&settings);
	skipped.register(filename()).unwrap();
	let skipped = skipped.finish();
	assert!(skipped.is_empty());
	assert!(!skipped.not_requiring_content_indices().contains(&IndexId::filename()));
	assert!(skipped.indices_for_directories().is_empty());
}

#[test]
fn directory_flag_is_ignored_for_content_indexes() {
	let mut builder = builder(&IndexingSettings::default());
	let id = IndexId::create("registry-test.content-dirs");
	builder.register(IndexDescriptor::new(id).with_directories(true)).unwrap();
	let registry = builder.finish();

	assert!(registry.is_content_dependent(id));
	assert!(registry.indices_for_directories().is_empty());
}
