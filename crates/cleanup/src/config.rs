//! Static switches consulted by the registry at fixed decision points.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Registry configuration.
///
/// Missing keys fall back to [`RegistryConfig::default`]; unknown keys are rejected.
///
/// ```
/// use reaper_cleanup::RegistryConfig;
///
/// let config = RegistryConfig::from_toml_str("allow_force_cleanup = false").unwrap();
/// assert!(!config.allow_force_cleanup);
/// assert!(config.include_controller_by_default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Turns every cleanup request into a no-op.
	pub globally_disable_cleanup: bool,
	/// Whether a forced request may override controller veto and missing-controller policy.
	pub allow_force_cleanup: bool,
	/// Default for appending the controller itself to its own node list on registration.
	pub include_controller_by_default: bool,
	/// Default policy for entries whose controller is gone when cleanup is requested.
	pub proceed_when_controller_missing_by_default: bool,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			globally_disable_cleanup: false,
			allow_force_cleanup: true,
			include_controller_by_default: true,
			proceed_when_controller_missing_by_default: true,
		}
	}
}

impl RegistryConfig {
	/// Parses a configuration from TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Applies the force gate: a forced request only counts if forcing is allowed.
	pub const fn effective_force(&self, requested: bool) -> bool {
		requested && self.allow_force_cleanup
	}
}
