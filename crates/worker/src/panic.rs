use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Panic captured from a background task body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task panicked: {message}")]
pub struct TaskPanicked {
	message: String,
}

impl TaskPanicked {
	/// Returns the extracted panic message.
	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Runs `f`, converting a panic into [`TaskPanicked`].
///
/// Background bodies are expected to resolve a promise on every path; the
/// caller maps the captured panic into its own failure value instead of
/// leaving waiters parked forever.
pub fn catch_panic<F, R>(f: F) -> Result<R, TaskPanicked>
where
	F: FnOnce() -> R,
{
	catch_unwind(AssertUnwindSafe(f)).map_err(|payload| TaskPanicked {
		message: panic_message(payload.as_ref()),
	})
}

/// Extracts a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		(*msg).to_string()
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.clone()
	} else {
		"non-string panic payload".to_string()
	}
}
