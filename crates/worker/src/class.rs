/// Execution classes used for worker scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// One-time setup whose result other work depends on (index configuration build-out).
	Genesis,
	/// Follow-up maintenance that may be skipped once shutdown is requested.
	Background,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Genesis => "genesis",
			Self::Background => "background",
		}
	}
}
