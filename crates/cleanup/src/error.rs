//! Error types for the cleanup registry.

use std::path::PathBuf;

use thiserror::Error;

use crate::ids::CleanupKey;

/// Failure of a keyed cleanup request.
///
/// Veto, missing entries and untrackable controllers are normal outcomes and never appear here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CleanupError {
	/// Nodes had to be detached but no host bridge is bound.
	#[error("no detach bridge bound while cleaning up entry {key}")]
	NoBridge {
		/// Entry whose detachment step aborted.
		key: CleanupKey,
	},
}

/// Result type for cleanup operations.
pub type Result<T> = std::result::Result<T, CleanupError>;

/// Errors that can occur when loading registry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an unknown/mistyped switch.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}
