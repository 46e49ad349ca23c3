//! File-based index registration and lifecycle coordination.
//!
//! Indexer definitions ([`IndexDescriptor`]) are registered once per cycle on
//! a background genesis task, which assembles the immutable
//! [`IndexConfiguration`]. Callers either block on it with cancellation
//! ([`RegisteredIndexes::configuration_state`]) or await it. Once the cycle
//! is initialized, [`RegisteredIndexes::required_indexes`] decides which
//! indexes must process a file, and [`DocumentUpdateTask`]s re-index unsaved
//! documents per content-dependent index.
//!
//! [`IndexingService`] owns the current cycle, replaces it when extensions
//! change and performs process shutdown exactly once.

mod configuration;
mod descriptor;
pub mod error;
mod evaluator;
mod file;
mod host;
mod id;
mod lifecycle;
mod registered;
mod registry;
mod service;
mod settings;
#[cfg(test)]
mod test_support;
mod update;

pub use configuration::IndexConfiguration;
pub use descriptor::{FilePredicate, IndexDescriptor, InputFilter};
pub use error::{BuildError, IndexError};
pub use evaluator::RequiredIndexesEvaluator;
pub use file::{DocumentId, IndexedFile, UnsavedDocument};
pub use host::{ExtensionSource, FileTypeRegistry, IndexStorage, IndexingContext};
pub use id::{FILENAME_INDEX_NAME, FileType, IndexId};
pub use lifecycle::{Lifecycle, LifecyclePhase};
pub use registered::{ConfigurationOutcome, RegisteredIndexes};
pub use registry::{Registry, RegistryBuilder};
pub use service::IndexingService;
pub use settings::{DEFAULT_FILE_SIZE_LIMIT, IndexingSettings};
pub use update::DocumentUpdateTask;

