use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

/// Runtime used when the caller is not inside one.
fn fallback_runtime() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("lode-worker")
			.build()
			.expect("failed to build lode-worker fallback runtime")
	})
}

/// Handle of the caller's runtime, or of the fallback runtime.
fn runtime_handle() -> Handle {
	Handle::try_current().unwrap_or_else(|_| fallback_runtime().handle().clone())
}

/// Runs `f` on the blocking pool under a span naming its task class.
///
/// Coordinators are built from plain threads as often as from async code,
/// and their background bodies park on condition variables, so every task
/// goes to the blocking pool.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let span = tracing::debug_span!("worker.task", class = class.as_str());
	tracing::trace!(parent: &span, "worker.spawn_blocking");
	runtime_handle().spawn_blocking(move || span.in_scope(f))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn falls_back_outside_a_runtime() {
		let handle = spawn_blocking(TaskClass::Background, || 40 + 2);
		assert_eq!(fallback_runtime().block_on(handle).unwrap(), 42);
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn uses_the_callers_runtime() {
		let thread = spawn_blocking(TaskClass::Genesis, || std::thread::current().name().map(str::to_owned)).await.unwrap();
		assert_ne!(thread.as_deref(), Some("lode-worker"));
	}
}
