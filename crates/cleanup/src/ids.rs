use std::fmt;

/// Stable integer identity of a tracked controller.
///
/// The same value doubles as the host-assigned tag of a view node, which is how a node listed in
/// one entry is matched against another entry's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CleanupKey(pub i64);

impl CleanupKey {
	pub const fn get(self) -> i64 {
		self.0
	}
}

impl From<i64> for CleanupKey {
	fn from(raw: i64) -> Self {
		Self(raw)
	}
}

impl fmt::Display for CleanupKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}
