use std::path::PathBuf;
use std::sync::Arc;

use lode_worker::Cancelled;

use crate::IndexId;

/// Failure reported by the extension host while listing descriptors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ExtensionError {
	message: String,
}

impl ExtensionError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// Failure reported by the storage engine while opening an index.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StorageError {
	message: String,
}

impl StorageError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// Fatal failure of the configuration build. Never retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
	#[error("index {index} is registered more than once")]
	DuplicateIndex { index: IndexId },

	#[error("failed to load index extensions: {0}")]
	Extensions(#[from] ExtensionError),

	#[error("failed to open storage for index {index}: {source}")]
	Storage {
		index: IndexId,
		#[source]
		source: StorageError,
	},

	#[error("index configuration build panicked: {0}")]
	Panicked(String),
}

/// Errors surfaced to callers of the indexing coordinator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
	/// The caller's own cancellation token fired while waiting.
	#[error(transparent)]
	Cancelled(#[from] Cancelled),

	/// The configuration build failed; index functionality stays degraded.
	#[error("index configuration is unavailable: {0}")]
	Configuration(#[source] Arc<BuildError>),

	#[error("required indexes are not initialized yet")]
	NotInitialized,

	#[error("indexing is shut down")]
	ShutDown,
}

impl IndexError {
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Self::Cancelled(_))
	}
}

/// Errors loading [`crate::IndexingSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid indexing settings: {0}")]
	Parse(#[from] toml::de::Error),
}
