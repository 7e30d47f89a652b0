// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant data cache.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Something that holds tenant data and must be emptied on a context switch.
pub trait CacheInvalidator: Send + Sync {
	fn invalidate_all(&self);
}

/// Query results keyed by scoped cache key.
#[derive(Debug)]
pub struct DataCache<T> {
	entries: RwLock<HashMap<String, Vec<T>>>,
}

impl<T> Default for DataCache<T> {
	fn default() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
		}
	}
}

impl<T: Clone> DataCache<T> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<Vec<T>> {
		self.entries.read().get(key).cloned()
	}

	pub fn insert(&self, key: String, items: Vec<T>) {
		self.entries.write().insert(key, items);
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl<T: Send + Sync> CacheInvalidator for DataCache<T> {
	fn invalidate_all(&self) {
		let mut entries = self.entries.write();
		if !entries.is_empty() {
			tracing::debug!(entries = entries.len(), "clearing tenant data cache");
		}
		entries.clear();
	}
}
