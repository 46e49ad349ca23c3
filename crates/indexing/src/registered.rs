//! Registration and lifecycle coordinator for one indexing cycle.
//!
//! # Role
//!
//! [`RegisteredIndexes`] owns everything derived from the registered indexer
//! descriptors: the frozen [`Registry`], the [`IndexConfiguration`] built on a
//! genesis task, the [`RequiredIndexesEvaluator`] and the unsaved-document
//! update tasks. Construction submits the configuration build immediately,
//! so callers never pay for index setup on the constructing thread.
//!
//! # Invariants
//!
//! - The configuration is published through `ArcSwapOption`; readers get
//!   either nothing or the complete snapshot.
//! - The build runs at most once per cycle and its failure is never retried.
//! - The up-to-date task starts only after the configuration promise
//!   resolved and skips its body once shutdown was requested.
//! - Evaluators are replaced wholesale; lookups in flight keep their snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use lode_worker::{Promise, TaskClass, catch_panic};
use tokio_util::sync::CancellationToken;

use crate::configuration::IndexConfiguration;
use crate::error::{BuildError, IndexError};
use crate::evaluator::RequiredIndexesEvaluator;
use crate::host::IndexingContext;
use crate::lifecycle::{Lifecycle, LifecyclePhase};
use crate::registry::{Registry, RegistryBuilder};
use crate::update::DocumentUpdateTask;
use crate::{FileType, IndexId, IndexedFile, UnsavedDocument};

/// Terminal value of the configuration build.
pub type ConfigurationOutcome = Result<Arc<IndexConfiguration>, Arc<BuildError>>;

pub struct RegisteredIndexes {
	context: IndexingContext,
	lifecycle: Lifecycle,
	build_submitted: AtomicBool,
	registry: ArcSwapOption<Registry>,
	state: ArcSwapOption<IndexConfiguration>,
	state_future: Promise<ConfigurationOutcome>,
	up_to_date_future: ArcSwap<Promise<()>>,
	evaluator: ArcSwapOption<RequiredIndexesEvaluator>,
}

impl RegisteredIndexes {
	/// Creates the coordinator for cycle `generation` and submits its configuration build.
	pub fn new(context: IndexingContext, generation: u64) -> Arc<Self> {
		let this = Arc::new(Self {
			context,
			lifecycle: Lifecycle::new(generation),
			build_submitted: AtomicBool::new(false),
			registry: ArcSwapOption::empty(),
			state: ArcSwapOption::empty(),
			state_future: Promise::new(),
			up_to_date_future: ArcSwap::from_pointee(Promise::new()),
			evaluator: ArcSwapOption::empty(),
		});
		this.submit_build();
		this
	}

	/// Schedules the configuration build once and returns its promise.
	pub fn submit_build(self: &Arc<Self>) -> Promise<ConfigurationOutcome> {
		if self.build_submitted.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
			self.lifecycle.advance(LifecyclePhase::ExtensionsLoading);
			let this = Arc::clone(self);
			lode_worker::spawn_blocking(TaskClass::Genesis, move || this.run_genesis());
		}
		self.state_future.clone()
	}

	fn run_genesis(self: Arc<Self>) {
		let _span = tracing::info_span!("index.genesis", generation = self.generation()).entered();
		let outcome = catch_panic(|| self.build_configuration()).unwrap_or_else(|panic| Err(BuildError::Panicked(panic.message().to_string())));

		match outcome {
			Ok(state) => {
				let registry = state.registry();
				tracing::info!(
					indexes = registry.len(),
					content_dependent = registry.requiring_content_indices().len(),
					directories = registry.indices_for_directories().len(),
					fingerprint = state.fingerprint(),
					"index configuration built"
				);
				self.set_state(Arc::clone(&state));
				self.mark_initialized();
				self.state_future.resolve(Ok(state));
				self.ensure_loaded_indexes_up_to_date();
			}
			Err(err) => {
				tracing::error!(error = %err, "index configuration build failed");
				self.state_future.resolve(Err(Arc::new(err)));
			}
		}
	}

	fn build_configuration(&self) -> Result<Arc<IndexConfiguration>, BuildError> {
		let descriptors = self.context.extensions.descriptors()?;
		let mut builder = RegistryBuilder::new(&self.context.settings, Arc::clone(&self.context.storage));
		for descriptor in descriptors {
			builder.register(descriptor)?;
		}
		let registry = Arc::new(builder.finish());
		self.registry.store(Some(Arc::clone(&registry)));
		self.extensions_data_was_loaded();

		self.lifecycle.advance(LifecyclePhase::Initializing);
		let state = IndexConfiguration::assemble(registry, self.context.storage.as_ref())?;
		Ok(Arc::new(state))
	}

	/// Claims shutdown of this cycle. Returns `true` for exactly one caller.
	pub fn perform_shutdown(&self) -> bool {
		let won = self.lifecycle.perform_shutdown();
		if won {
			tracing::debug!(generation = self.generation(), "index.cycle.shutdown");
		}
		won
	}

	pub fn set_state(&self, state: Arc<IndexConfiguration>) {
		self.state.store(Some(state));
	}

	/// Cached configuration, if already published.
	pub fn state(&self) -> Option<Arc<IndexConfiguration>> {
		self.state.load_full()
	}

	/// Returns the configuration, blocking until it is built.
	///
	/// The wait observes `cancel`; firing it yields [`IndexError::Cancelled`]
	/// without affecting other waiters. A failed build yields
	/// [`IndexError::Configuration`] on every call.
	pub fn configuration_state(&self, cancel: &CancellationToken) -> Result<Arc<IndexConfiguration>, IndexError> {
		if let Some(state) = self.state.load_full() {
			return Ok(state);
		}
		let state = self.state_future.wait_blocking(cancel, self.poll_interval())?.map_err(IndexError::Configuration)?;
		self.state.store(Some(Arc::clone(&state)));
		Ok(state)
	}

	/// Async counterpart of [`Self::configuration_state`].
	pub async fn wait_configuration(&self, cancel: &CancellationToken) -> Result<Arc<IndexConfiguration>, IndexError> {
		if let Some(state) = self.state.load_full() {
			return Ok(state);
		}
		let state = self.state_future.wait(cancel).await?.map_err(IndexError::Configuration)?;
		self.state.store(Some(Arc::clone(&state)));
		Ok(state)
	}

	/// Promise of the configuration build.
	pub fn configuration_future(&self) -> Promise<ConfigurationOutcome> {
		self.state_future.clone()
	}

	pub fn wait_until_indices_are_initialized(&self, cancel: &CancellationToken) -> Result<(), IndexError> {
		self.configuration_state(cancel).map(|_| ())
	}

	/// Waits for the configuration and for the up-to-date confirmation.
	pub fn wait_until_all_indices_are_initialized(&self, cancel: &CancellationToken) -> Result<(), IndexError> {
		self.wait_until_indices_are_initialized(cancel)?;
		self.up_to_date_future.load_full().wait_blocking(cancel, self.poll_interval())?;
		Ok(())
	}

	pub fn extensions_data_was_loaded(&self) {
		self.lifecycle.advance(LifecyclePhase::ExtensionsLoaded);
	}

	pub fn is_extensions_data_loaded(&self) -> bool {
		self.lifecycle.phase() >= LifecyclePhase::ExtensionsLoaded
	}

	/// Marks registration complete and builds a fresh evaluator.
	pub fn mark_initialized(&self) {
		if !self.rebuild_evaluator() {
			tracing::warn!(generation = self.generation(), "mark_initialized called before extensions were loaded");
			return;
		}
		self.lifecycle.advance(LifecyclePhase::Initialized);
	}

	/// Drops cached per-file hints by replacing the evaluator.
	pub fn reset_hints(&self) {
		if !self.rebuild_evaluator() {
			tracing::debug!(generation = self.generation(), "index hints reset before extensions were loaded");
		}
	}

	fn rebuild_evaluator(&self) -> bool {
		let Some(registry) = self.registry.load_full() else {
			return false;
		};
		let file_types = self.context.file_types.registered_file_types();
		let evaluator = RequiredIndexesEvaluator::new(registry, &file_types, self.context.settings.file_size_limit);
		self.evaluator.store(Some(Arc::new(evaluator)));
		true
	}

	pub fn is_initialized(&self) -> bool {
		self.lifecycle.phase() >= LifecyclePhase::Initialized
	}

	pub fn phase(&self) -> LifecyclePhase {
		self.lifecycle.phase()
	}

	pub fn generation(&self) -> u64 {
		self.lifecycle.generation()
	}

	pub fn is_shutdown_requested(&self) -> bool {
		self.lifecycle.is_shutdown_requested()
	}

	/// Cancelled once this cycle is shut down.
	pub fn shutdown_token(&self) -> &CancellationToken {
		self.lifecycle.token().cancellation()
	}

	/// Schedules confirmation that every loaded index is current.
	///
	/// The task waits for the configuration first and does nothing once
	/// shutdown has been requested.
	pub fn ensure_loaded_indexes_up_to_date(self: &Arc<Self>) {
		let promise = self.next_up_to_date_promise();
		let this = Arc::clone(self);
		lode_worker::spawn_blocking(TaskClass::Background, move || {
			let _span = tracing::debug_span!("index.up_to_date", generation = this.generation()).entered();
			match this.state_future.wait_blocking(this.shutdown_token(), this.poll_interval()) {
				Ok(Ok(_)) => {}
				Ok(Err(_)) => return,
				Err(_) => {
					tracing::debug!("shutdown before configuration was built; skipping");
					promise.resolve(());
					return;
				}
			}

			if this.lifecycle.is_shutdown_requested() {
				tracing::debug!("shutdown requested; skipping up-to-date check");
			} else if let Err(panic) = catch_panic(|| {
				this.context.storage.ensure_stale_ids_deleted();
				this.context.storage.ensure_up_to_date();
			}) {
				tracing::error!(error = %panic, "ensuring indexes are up to date failed");
			}
			promise.resolve(());
		});
	}

	/// Returns the pending up-to-date promise, installing a fresh one when the
	/// current one already resolved.
	fn next_up_to_date_promise(&self) -> Promise<()> {
		let fresh = Promise::new();
		let mut installed = false;
		let previous = self.up_to_date_future.rcu(|current| {
			installed = current.is_done();
			if installed {
				Arc::new(fresh.clone())
			} else {
				Arc::clone(current)
			}
		});
		if installed { fresh } else { Promise::clone(&previous) }
	}

	/// True once the configuration is built and indexes were confirmed current.
	pub fn are_indexes_ready(&self) -> bool {
		self.state_future.is_done() && self.up_to_date_future.load().is_done()
	}

	/// Frozen registry, available once extensions were loaded.
	pub fn registry(&self) -> Option<Arc<Registry>> {
		self.registry.load_full()
	}

	pub fn is_content_dependent_index(&self, id: IndexId) -> bool {
		self.registry.load_full().is_some_and(|registry| registry.is_content_dependent(id))
	}

	/// Update task for unsaved documents; `None` when `id` is not content-dependent.
	pub fn unsaved_data_update_task(&self, id: IndexId) -> Option<DocumentUpdateTask> {
		self.registry.load_full()?.update_task(id).cloned()
	}

	/// Re-indexes unsaved documents for one index on the calling thread.
	///
	/// Returns `false` when the index has no update task.
	pub fn index_unsaved_documents(&self, id: IndexId, documents: &[UnsavedDocument], cancel: &CancellationToken) -> Result<bool, IndexError> {
		let Some(task) = self.unsaved_data_update_task(id) else {
			return Ok(false);
		};
		task.process_all(documents, cancel, self.poll_interval())?;
		Ok(true)
	}

	/// Current evaluator snapshot.
	pub fn evaluator(&self) -> Option<Arc<RequiredIndexesEvaluator>> {
		self.evaluator.load_full()
	}

	pub fn required_indexes(&self, file: &IndexedFile) -> Result<Vec<IndexId>, IndexError> {
		let evaluator = self.evaluator.load_full().ok_or(IndexError::NotInitialized)?;
		Ok(evaluator.required_indexes(file))
	}

	/// See [`RequiredIndexesEvaluator::required_indexes_for_file_type`].
	#[doc(hidden)]
	pub fn required_indexes_for_file_type(&self, file_type: &FileType) -> Result<(Vec<IndexId>, Vec<IndexId>), IndexError> {
		let evaluator = self.evaluator.load_full().ok_or(IndexError::NotInitialized)?;
		Ok(evaluator.required_indexes_for_file_type(file_type))
	}

	pub(crate) fn poll_interval(&self) -> Duration {
		self.context.settings.await_poll_interval()
	}
}

impl std::fmt::Debug for RegisteredIndexes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegisteredIndexes")
			.field("generation", &self.generation())
			.field("phase", &self.phase())
			.field("shutdown", &self.is_shutdown_requested())
			.field("ready", &self.are_indexes_ready())
			.finish_non_exhaustive()
	}
}
