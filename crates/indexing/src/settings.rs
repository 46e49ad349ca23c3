//! Tunables for the indexing coordinator, loaded from `indexing.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! skip-superseded-filename-index = true
//! file-size-limit = 2560000
//! await-poll-interval-ms = 10
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SettingsError;

/// Default upper bound for content indexing, in bytes.
pub const DEFAULT_FILE_SIZE_LIMIT: u64 = 2_560_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IndexingSettings {
	/// Skip registering the built-in filename index because file names are
	/// already served by the virtual file system.
	pub skip_superseded_filename_index: bool,
	/// Files larger than this are only offered to metadata indexers, unless
	/// their type is exempt.
	pub file_size_limit: u64,
	/// How often blocked waiters re-check their cancellation token.
	pub await_poll_interval_ms: u64,
}

impl Default for IndexingSettings {
	fn default() -> Self {
		Self {
			skip_superseded_filename_index: false,
			file_size_limit: DEFAULT_FILE_SIZE_LIMIT,
			await_poll_interval_ms: 10,
		}
	}
}

impl IndexingSettings {
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Loads settings from `path`, falling back to defaults when the file does not exist.
	pub fn load(path: &Path) -> Result<Self, SettingsError> {
		match std::fs::read_to_string(path) {
			Ok(source) => Self::from_toml_str(&source),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "indexing settings not found, using defaults");
				Ok(Self::default())
			}
			Err(source) => Err(SettingsError::Io {
				path: path.to_path_buf(),
				source,
			}),
		}
	}

	/// Poll interval as a duration, never zero.
	pub fn await_poll_interval(&self) -> Duration {
		Duration::from_millis(self.await_poll_interval_ms.max(1))
	}
}
