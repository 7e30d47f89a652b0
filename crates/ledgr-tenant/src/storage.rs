// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-tab session storage.
//!
//! The impersonation record is the only state kept here. It survives a
//! reload of the same tab but is never shared across devices.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;

/// Short-lived key/value storage scoped to one browser tab.
pub trait SessionStorage: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>>;
	fn set(&self, key: &str, value: String) -> Result<()>;
	fn remove(&self, key: &str) -> Result<()>;
}

/// In-process [`SessionStorage`].
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
	entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl SessionStorage for MemorySessionStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.read().get(key).cloned())
	}

	fn set(&self, key: &str, value: String) -> Result<()> {
		self.entries.write().insert(key.to_string(), value);
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.entries.write().remove(key);
		Ok(())
	}
}
