// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission resolution.
//!
//! [`PermissionResolver::resolve`] answers "may this subject perform this
//! action on this module" in a fixed order:
//!
//! 1. **System bypass**: a platform operator is allowed everything. This only
//!    governs UI visibility; tenant data isolation is enforced by the
//!    org-scoped query guard in `ledgr-tenant`.
//! 2. **Owner bypass**: an organization owner is allowed every module and
//!    action.
//! 3. **Override tier**: an override for the exact `(module, action, role)`
//!    key wins over the compiled default.
//! 4. **Compiled matrix**: [`crate::matrix`].
//!
//! Until the override tier is [`OverrideState::Ready`], every check that is
//! not settled by a bypass resolves to [`Decision::Pending`], which callers
//! must treat as a denial. Nothing in this module panics or returns an error
//! for a check.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AuthError, Result};
use crate::matrix;
use crate::overrides::{
	OverrideChange, OverrideState, OverrideStateKind, OverrideStore, PermissionKey,
	PermissionOverrides,
};
use crate::types::{Module, PermissionAction, SubjectRoles};

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	Allowed,
	Denied,
	/// Not known yet; the override tier is still loading.
	Pending,
}

impl Decision {
	/// Only [`Decision::Allowed`] permits the action.
	pub fn is_allowed(&self) -> bool {
		matches!(self, Decision::Allowed)
	}

	pub fn is_pending(&self) -> bool {
		matches!(self, Decision::Pending)
	}
}

impl From<bool> for Decision {
	fn from(allowed: bool) -> Self {
		if allowed {
			Decision::Allowed
		} else {
			Decision::Denied
		}
	}
}

/// Resolves permission checks against the bypass rules, the override tier
/// and the compiled matrix.
pub struct PermissionResolver {
	store: Option<Arc<dyn OverrideStore>>,
	state: RwLock<OverrideState>,
	/// Changes seen while a fetch is in flight, replayed over its result.
	in_flight: Mutex<Option<Vec<OverrideChange>>>,
	load_timeout: Option<Duration>,
}

impl std::fmt::Debug for PermissionResolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionResolver")
			.field("has_store", &self.store.is_some())
			.field("state", &self.state_kind())
			.field("load_timeout", &self.load_timeout)
			.finish()
	}
}

impl PermissionResolver {
	/// A resolver backed only by the compiled matrix. Ready immediately.
	pub fn compiled() -> Self {
		Self {
			store: None,
			state: RwLock::new(OverrideState::Ready(PermissionOverrides::new())),
			in_flight: Mutex::new(None),
			load_timeout: None,
		}
	}

	/// A resolver with an override store. Not ready until [`Self::load`] succeeds.
	pub fn with_store(store: Arc<dyn OverrideStore>) -> Self {
		Self {
			store: Some(store),
			state: RwLock::new(OverrideState::Uninitialized),
			in_flight: Mutex::new(None),
			load_timeout: None,
		}
	}

	/// Bound the time spent waiting for the override store.
	pub fn load_timeout(mut self, timeout: Duration) -> Self {
		self.load_timeout = Some(timeout);
		self
	}

	pub fn state_kind(&self) -> OverrideStateKind {
		self.state.read().kind()
	}

	pub fn is_ready(&self) -> bool {
		self.state_kind() == OverrideStateKind::Ready
	}

	/// Performs the initial load of the override tier.
	///
	/// Checks resolve to [`Decision::Pending`] while the load is in flight.
	/// A failed load leaves the resolver in [`OverrideState::Failed`].
	#[instrument(level = "debug", skip(self))]
	pub async fn load(&self) -> Result<()> {
		let Some(store) = self.store.clone() else {
			return Ok(());
		};

		*self.state.write() = OverrideState::Loading;

		match self.fetch(store.as_ref()).await {
			Ok(overrides) => {
				let replayed = self.commit(overrides);
				tracing::debug!(replayed, "permission overrides loaded");
				Ok(())
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to load permission overrides");
				let mut state = self.state.write();
				self.in_flight.lock().take();
				*state = OverrideState::Failed(e.to_string());
				Err(e)
			}
		}
	}

	/// Re-reads the override tier, serving the previous overrides until the
	/// new set arrives. A failed reload keeps a previously ready state.
	#[instrument(level = "debug", skip(self))]
	pub async fn reload(&self) -> Result<()> {
		if !self.is_ready() {
			return self.load().await;
		}
		let Some(store) = self.store.clone() else {
			return Ok(());
		};

		match self.fetch(store.as_ref()).await {
			Ok(overrides) => {
				self.commit(overrides);
				Ok(())
			}
			Err(e) => {
				tracing::warn!(error = %e, "reload failed, keeping previous overrides");
				self.in_flight.lock().take();
				Err(e)
			}
		}
	}

	async fn fetch(&self, store: &dyn OverrideStore) -> Result<PermissionOverrides> {
		*self.in_flight.lock() = Some(Vec::new());
		match self.load_timeout {
			Some(timeout) => tokio::time::timeout(timeout, store.load_overrides())
				.await
				.map_err(|_| AuthError::LoadTimeout(timeout))?,
			None => store.load_overrides().await,
		}
	}

	/// Publishes a fetched set with every change seen during the fetch
	/// applied on top. Returns the number of replayed changes.
	fn commit(&self, mut overrides: PermissionOverrides) -> usize {
		let mut state = self.state.write();
		let replayed = self.in_flight.lock().take().unwrap_or_default();
		for change in &replayed {
			overrides.apply(change);
		}
		*state = OverrideState::Ready(overrides);
		replayed.len()
	}

	/// Resolves a check. See the module docs for the order of evaluation.
	#[instrument(
		level = "debug",
		skip(self, subject),
		fields(
			system_role = ?subject.system_role,
			org_role = ?subject.org_role(),
			module = %module,
			action = %action,
		)
	)]
	pub fn resolve(
		&self,
		subject: &SubjectRoles,
		module: Module,
		action: PermissionAction,
	) -> Decision {
		if subject.is_platform_operator() {
			return Decision::Allowed;
		}
		if subject.is_owner() {
			return Decision::Allowed;
		}
		let Some(role) = subject.org_role() else {
			return Decision::Denied;
		};

		let decision = match &*self.state.read() {
			OverrideState::Ready(overrides) => {
				let key = PermissionKey::new(module, action, role);
				Decision::from(
					overrides
						.get(&key)
						.unwrap_or_else(|| matrix::is_allowed(module, action, role)),
				)
			}
			OverrideState::Uninitialized | OverrideState::Loading => Decision::Pending,
			OverrideState::Failed(_) => Decision::Denied,
		};

		tracing::debug!(?decision, "permission resolved");
		decision
	}

	/// Resolves a check given module and action names.
	///
	/// The system bypass applies before the names are parsed; any name that
	/// does not parse denies.
	pub fn resolve_raw(&self, subject: &SubjectRoles, module: &str, action: &str) -> Decision {
		if subject.is_platform_operator() {
			return Decision::Allowed;
		}
		match (module.parse::<Module>(), action.parse::<PermissionAction>()) {
			(Ok(module), Ok(action)) => self.resolve(subject, module, action),
			_ => {
				tracing::debug!(module, action, "unknown permission name, denying");
				Decision::Denied
			}
		}
	}

	pub fn can_perform(
		&self,
		subject: &SubjectRoles,
		module: Module,
		action: PermissionAction,
	) -> bool {
		self.resolve(subject, module, action).is_allowed()
	}

	pub fn can_view(&self, subject: &SubjectRoles, module: Module) -> bool {
		self.can_perform(subject, module, PermissionAction::View)
	}

	pub fn can_create(&self, subject: &SubjectRoles, module: Module) -> bool {
		self.can_perform(subject, module, PermissionAction::Create)
	}

	pub fn can_edit(&self, subject: &SubjectRoles, module: Module) -> bool {
		self.can_perform(subject, module, PermissionAction::Edit)
	}

	pub fn can_delete(&self, subject: &SubjectRoles, module: Module) -> bool {
		self.can_perform(subject, module, PermissionAction::Delete)
	}

	/// Persists an override and applies it locally.
	pub async fn set_override(&self, key: PermissionKey, allowed: bool) -> Result<()> {
		key.ensure_overridable()?;
		let store = self.store.as_ref().ok_or(AuthError::StoreNotConfigured)?;
		store.put_override(key, allowed).await?;
		self.apply_change(OverrideChange {
			key,
			allowed: Some(allowed),
		});
		tracing::info!(%key, allowed, "permission override set");
		Ok(())
	}

	/// Removes an override so the compiled default applies again.
	pub async fn clear_override(&self, key: PermissionKey) -> Result<bool> {
		let store = self.store.as_ref().ok_or(AuthError::StoreNotConfigured)?;
		let removed = store.delete_override(key).await?;
		self.apply_change(OverrideChange { key, allowed: None });
		tracing::info!(%key, removed, "permission override cleared");
		Ok(removed)
	}

	/// Applies an event from the override change feed.
	///
	/// Events that arrive while a load or reload is in flight are also
	/// replayed over the fetched set, since the store may have been read
	/// before the change. Events before any load starts are dropped; that
	/// load reads them from the store.
	pub fn apply_change(&self, change: OverrideChange) {
		if change.key.ensure_overridable().is_err() {
			return;
		}
		let mut state = self.state.write();
		if let Some(queued) = self.in_flight.lock().as_mut() {
			queued.push(change);
		}
		if let OverrideState::Ready(overrides) = &mut *state {
			overrides.apply(&change);
		}
	}
}

impl Default for PermissionResolver {
	fn default() -> Self {
		Self::compiled()
	}
}
