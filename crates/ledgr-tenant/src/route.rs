// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route classification.

use ledgr_config::{AccessConfig, DEFAULT_ADMIN_ROUTE_PREFIX};

/// Decides whether a route path belongs to the super-admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteClassifier {
	admin_prefixes: Vec<String>,
}

impl RouteClassifier {
	pub fn new<I, S>(prefixes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let admin_prefixes = prefixes
			.into_iter()
			.map(Into::into)
			.map(|p: String| p.trim_end_matches('/').to_string())
			.filter(|p| !p.is_empty())
			.collect();
		Self { admin_prefixes }
	}

	pub fn from_config(config: &AccessConfig) -> Self {
		Self::new(config.admin_route_prefixes.iter().cloned())
	}

	pub fn admin_prefixes(&self) -> &[String] {
		&self.admin_prefixes
	}

	/// A path is administrative when it equals an admin prefix or is nested
	/// under one. Query strings and fragments are ignored.
	pub fn is_admin_route(&self, path: &str) -> bool {
		let path = path.split(['?', '#']).next().unwrap_or_default();
		self.admin_prefixes.iter().any(|prefix| {
			path.strip_prefix(prefix.as_str())
				.is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
		})
	}
}

impl Default for RouteClassifier {
	fn default() -> Self {
		Self::new([DEFAULT_ADMIN_ROUTE_PREFIX])
	}
}
