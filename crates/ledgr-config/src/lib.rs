// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Ledgr.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`LEDGR_*`)
//! - Tracing subscriber setup driven by the logging section
//!
//! # Usage
//!
//! ```ignore
//! use ledgr_config::{init_tracing, load_config};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging)?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;
pub mod telemetry;

pub use error::ConfigError;
pub use layer::LedgrConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};
pub use telemetry::init_tracing;

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct LedgrConfig {
	pub access: AccessConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LEDGR_*`)
/// 2. Config file (`/etc/ledgr/ledgr.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<LedgrConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<LedgrConfig, ConfigError> {
	let mut merged = LedgrConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<LedgrConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LedgrConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LedgrConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: LedgrConfigLayer) -> Result<LedgrConfig, ConfigError> {
	let access = layer.access.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	access.validate()?;

	info!(
		admin_route_prefixes = ?access.admin_route_prefixes,
		business_tables = access.business_tables.len(),
		overrides_enabled = access.overrides_enabled,
		database = %database.url,
		"Ledgr configuration loaded"
	);

	Ok(LedgrConfig {
		access,
		database,
		logging,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource(Precedence, LedgrConfigLayer);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.0
		}

		fn load(&self) -> Result<LedgrConfigLayer, ConfigError> {
			Ok(self.1.clone())
		}
	}

	fn url_layer(url: &str) -> LedgrConfigLayer {
		LedgrConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some(url.to_string()),
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_defaults_finalize() {
		let config = finalize(LedgrConfigLayer::default()).unwrap();
		assert_eq!(config.database.url, "sqlite:./ledgr.db");
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.access.impersonation_storage_key, "ledgr.impersonation");
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource(Precedence::Environment, url_layer("sqlite:env.db"))),
			Box::new(FixedSource(Precedence::ConfigFile, url_layer("sqlite:file.db"))),
			Box::new(DefaultsSource),
		])
		.unwrap();
		assert_eq!(config.database.url, "sqlite:env.db");
	}

	#[test]
	fn test_invalid_access_section_fails_finalize() {
		let layer = LedgrConfigLayer {
			access: Some(AccessConfigLayer {
				admin_route_prefixes: Some(vec!["admin".to_string()]),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_file_values_reach_final_config() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[access]
impersonation_storage_key = "tab.impersonation"
overrides_enabled = false
"#
		)
		.unwrap();

		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		])
		.unwrap();
		assert_eq!(config.access.impersonation_storage_key, "tab.impersonation");
		assert!(!config.access.overrides_enabled);
		assert_eq!(config.access.fetch_timeout_ms, 15_000);
	}
}
