// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persisted per-role permission toggles.
//!
//! Overrides form the dynamic tier of permission resolution: an entry for an
//! exact `(module, action, role)` key wins over the compiled matrix. The
//! storage backend is behind [`OverrideStore`]; `ledgr-db` provides the SQLite
//! implementation and [`MemoryOverrideStore`] serves tests and embedded use.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::types::{Module, OrgRole, PermissionAction};

/// Key of a single override entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
	pub module: Module,
	pub action: PermissionAction,
	pub role: OrgRole,
}

impl PermissionKey {
	pub fn new(module: Module, action: PermissionAction, role: OrgRole) -> Self {
		Self {
			module,
			action,
			role,
		}
	}

	/// Owner always bypasses the matrix, so owner keys are never stored.
	pub fn ensure_overridable(&self) -> Result<()> {
		if self.role == OrgRole::Owner {
			return Err(AuthError::NotOverridable(self.role));
		}
		Ok(())
	}
}

impl fmt::Display for PermissionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}:{}", self.module, self.action, self.role)
	}
}

/// A loaded set of overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionOverrides {
	entries: HashMap<PermissionKey, bool>,
}

impl PermissionOverrides {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &PermissionKey) -> Option<bool> {
		self.entries.get(key).copied()
	}

	pub fn insert(&mut self, key: PermissionKey, allowed: bool) {
		self.entries.insert(key, allowed);
	}

	pub fn remove(&mut self, key: &PermissionKey) -> Option<bool> {
		self.entries.remove(key)
	}

	/// Applies one change-feed event.
	pub fn apply(&mut self, change: &OverrideChange) {
		match change.allowed {
			Some(allowed) => self.insert(change.key, allowed),
			None => {
				self.remove(&change.key);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&PermissionKey, &bool)> {
		self.entries.iter()
	}
}

impl FromIterator<(PermissionKey, bool)> for PermissionOverrides {
	fn from_iter<I: IntoIterator<Item = (PermissionKey, bool)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}

/// An event from the override change feed.
///
/// `allowed: None` means the override was removed and the compiled default
/// applies again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideChange {
	pub key: PermissionKey,
	pub allowed: Option<bool>,
}

/// Backing store for permission overrides.
#[async_trait]
pub trait OverrideStore: Send + Sync {
	/// Loads every override.
	async fn load_overrides(&self) -> Result<PermissionOverrides>;

	/// Creates or replaces one override.
	async fn put_override(&self, key: PermissionKey, allowed: bool) -> Result<()>;

	/// Removes one override. Returns true if it existed.
	async fn delete_override(&self, key: PermissionKey) -> Result<bool>;
}

/// In-process override store.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
	entries: RwLock<PermissionOverrides>,
}

impl MemoryOverrideStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entries(entries: PermissionOverrides) -> Self {
		Self {
			entries: RwLock::new(entries),
		}
	}
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
	async fn load_overrides(&self) -> Result<PermissionOverrides> {
		Ok(self.entries.read().clone())
	}

	async fn put_override(&self, key: PermissionKey, allowed: bool) -> Result<()> {
		key.ensure_overridable()?;
		self.entries.write().insert(key, allowed);
		Ok(())
	}

	async fn delete_override(&self, key: PermissionKey) -> Result<bool> {
		Ok(self.entries.write().remove(&key).is_some())
	}
}

/// Load state of the override tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideState {
	/// A store is configured but loading has not started.
	Uninitialized,
	/// The initial load is in flight.
	Loading,
	/// Overrides are known.
	Ready(PermissionOverrides),
	/// The load failed; checks deny until a reload succeeds.
	Failed(String),
}

impl OverrideState {
	pub fn kind(&self) -> OverrideStateKind {
		match self {
			OverrideState::Uninitialized => OverrideStateKind::Uninitialized,
			OverrideState::Loading => OverrideStateKind::Loading,
			OverrideState::Ready(_) => OverrideStateKind::Ready,
			OverrideState::Failed(_) => OverrideStateKind::Failed,
		}
	}
}

/// [`OverrideState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideStateKind {
	Uninitialized,
	Loading,
	Ready,
	Failed,
}
