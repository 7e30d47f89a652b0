// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control configuration section.
//!
//! Covers the knobs of the tenant isolation layer: which routes belong to the
//! super-admin console, where the impersonation record is kept, which tables
//! hold tenant business data, and how long loads may take.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_ADMIN_ROUTE_PREFIX: &str = "/super-admin";
pub const DEFAULT_IMPERSONATION_STORAGE_KEY: &str = "ledgr.impersonation";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_OVERRIDE_LOAD_TIMEOUT_MS: u64 = 10_000;

/// Tables whose rows belong to exactly one organization.
pub const DEFAULT_BUSINESS_TABLES: &[&str] = &[
	"customers",
	"invoices",
	"invoice_items",
	"quotations",
	"quotation_items",
	"payments",
	"expenses",
	"products",
	"employees",
	"attendance",
	"payroll",
	"salary_slips",
	"reports",
	"settings",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccessConfigLayer {
	pub admin_route_prefixes: Option<Vec<String>>,
	pub impersonation_storage_key: Option<String>,
	pub business_tables: Option<Vec<String>>,
	pub fetch_timeout_ms: Option<u64>,
	pub override_load_timeout_ms: Option<u64>,
	pub overrides_enabled: Option<bool>,
}

impl AccessConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.admin_route_prefixes.is_some() {
			self.admin_route_prefixes = other.admin_route_prefixes;
		}
		if other.impersonation_storage_key.is_some() {
			self.impersonation_storage_key = other.impersonation_storage_key;
		}
		if other.business_tables.is_some() {
			self.business_tables = other.business_tables;
		}
		if other.fetch_timeout_ms.is_some() {
			self.fetch_timeout_ms = other.fetch_timeout_ms;
		}
		if other.override_load_timeout_ms.is_some() {
			self.override_load_timeout_ms = other.override_load_timeout_ms;
		}
		if other.overrides_enabled.is_some() {
			self.overrides_enabled = other.overrides_enabled;
		}
	}

	pub fn finalize(self) -> AccessConfig {
		let defaults = AccessConfig::default();
		AccessConfig {
			admin_route_prefixes: self
				.admin_route_prefixes
				.unwrap_or(defaults.admin_route_prefixes),
			impersonation_storage_key: self
				.impersonation_storage_key
				.unwrap_or(defaults.impersonation_storage_key),
			business_tables: self.business_tables.unwrap_or(defaults.business_tables),
			fetch_timeout_ms: self.fetch_timeout_ms.unwrap_or(defaults.fetch_timeout_ms),
			override_load_timeout_ms: self
				.override_load_timeout_ms
				.unwrap_or(defaults.override_load_timeout_ms),
			overrides_enabled: self.overrides_enabled.unwrap_or(defaults.overrides_enabled),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessConfig {
	pub admin_route_prefixes: Vec<String>,
	pub impersonation_storage_key: String,
	pub business_tables: Vec<String>,
	pub fetch_timeout_ms: u64,
	pub override_load_timeout_ms: u64,
	pub overrides_enabled: bool,
}

impl AccessConfig {
	pub fn fetch_timeout(&self) -> Duration {
		Duration::from_millis(self.fetch_timeout_ms)
	}

	pub fn override_load_timeout(&self) -> Duration {
		Duration::from_millis(self.override_load_timeout_ms)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		for prefix in &self.admin_route_prefixes {
			if !prefix.starts_with('/') || prefix == "/" {
				return Err(ConfigError::Validation(format!(
					"admin route prefix '{prefix}' must start with '/' and must not be the root path"
				)));
			}
		}
		if self.impersonation_storage_key.trim().is_empty() {
			return Err(ConfigError::Validation(
				"impersonation storage key must not be empty".to_string(),
			));
		}
		if self.fetch_timeout_ms == 0 {
			return Err(ConfigError::Validation(
				"LEDGR_FETCH_TIMEOUT_MS must be greater than zero".to_string(),
			));
		}
		if self.override_load_timeout_ms == 0 {
			return Err(ConfigError::Validation(
				"LEDGR_OVERRIDE_LOAD_TIMEOUT_MS must be greater than zero".to_string(),
			));
		}
		Ok(())
	}
}

impl Default for AccessConfig {
	fn default() -> Self {
		Self {
			admin_route_prefixes: vec![DEFAULT_ADMIN_ROUTE_PREFIX.to_string()],
			impersonation_storage_key: DEFAULT_IMPERSONATION_STORAGE_KEY.to_string(),
			business_tables: DEFAULT_BUSINESS_TABLES.iter().map(|t| t.to_string()).collect(),
			fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
			override_load_timeout_ms: DEFAULT_OVERRIDE_LOAD_TIMEOUT_MS,
			overrides_enabled: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_default_values() {
		let config = AccessConfigLayer::default().finalize();
		assert_eq!(config.admin_route_prefixes, vec!["/super-admin".to_string()]);
		assert_eq!(config.impersonation_storage_key, "ledgr.impersonation");
		assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
		assert_eq!(config.override_load_timeout(), Duration::from_secs(10));
		assert!(config.overrides_enabled);
		assert!(config.business_tables.iter().any(|t| t == "invoices"));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_merge_overrides_set_fields_only() {
		let mut base = AccessConfigLayer {
			fetch_timeout_ms: Some(500),
			overrides_enabled: Some(false),
			..Default::default()
		};
		base.merge(AccessConfigLayer {
			fetch_timeout_ms: Some(2_000),
			..Default::default()
		});
		let config = base.finalize();
		assert_eq!(config.fetch_timeout_ms, 2_000);
		assert!(!config.overrides_enabled);
	}

	#[test]
	fn test_root_prefix_rejected() {
		let config = AccessConfig {
			admin_route_prefixes: vec!["/".to_string()],
			..Default::default()
		};
		assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_empty_storage_key_rejected() {
		let config = AccessConfig {
			impersonation_storage_key: "  ".to_string(),
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_zero_timeouts_rejected() {
		let config = AccessConfig {
			fetch_timeout_ms: 0,
			..Default::default()
		};
		assert!(config.validate().is_err());

		let config = AccessConfig {
			override_load_timeout_ms: 0,
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	proptest! {
		#[test]
		fn relative_prefixes_are_rejected(prefix in "[a-z][a-z-]{0,15}") {
			let config = AccessConfig {
				admin_route_prefixes: vec![prefix],
				..Default::default()
			};
			prop_assert!(config.validate().is_err());
		}

		#[test]
		fn absolute_prefixes_are_accepted(prefix in "/[a-z][a-z-]{0,15}") {
			let config = AccessConfig {
				admin_route_prefixes: vec![prefix],
				..Default::default()
			};
			prop_assert!(config.validate().is_ok());
		}
	}
}
