// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform-operator impersonation of a tenant.
//!
//! The [`ImpersonationController`] is the single writer of the
//! [`ImpersonationRecord`]. The record is persisted as JSON in
//! [`SessionStorage`] so it survives a reload of the same tab, and every
//! change is published as an [`ImpersonationEvent`] for the classifier to
//! pick up.

use std::sync::Arc;

use ledgr_auth::{OrgId, SubjectRoles};
use ledgr_config::{AccessConfig, DEFAULT_IMPERSONATION_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::instrument;

use crate::error::{Result, TenantError};
use crate::storage::SessionStorage;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// The organization an operator is acting as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationTarget {
	pub organization_id: OrgId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub organization_name: Option<String>,
}

impl ImpersonationTarget {
	pub fn new(organization_id: OrgId) -> Self {
		Self {
			organization_id,
			organization_name: None,
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.organization_name = Some(name.into());
		self
	}
}

/// Persisted impersonation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationRecord {
	pub is_impersonating: bool,
	#[serde(default)]
	pub target: Option<ImpersonationTarget>,
}

impl ImpersonationRecord {
	pub fn inactive() -> Self {
		Self::default()
	}

	pub fn active(target: ImpersonationTarget) -> Self {
		Self {
			is_impersonating: true,
			target: Some(target),
		}
	}

	/// A record claiming impersonation without a target is not active.
	pub fn is_active(&self) -> bool {
		self.is_impersonating && self.target.is_some()
	}

	/// The target organization while active.
	pub fn organization_id(&self) -> Option<OrgId> {
		if self.is_impersonating {
			self.target.as_ref().map(|t| t.organization_id)
		} else {
			None
		}
	}
}

/// Published on every start and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationEvent {
	pub is_impersonating: bool,
	pub organization_id: Option<OrgId>,
}

impl From<&ImpersonationRecord> for ImpersonationEvent {
	fn from(record: &ImpersonationRecord) -> Self {
		Self {
			is_impersonating: record.is_active(),
			organization_id: record.organization_id(),
		}
	}
}

impl From<ImpersonationEvent> for ImpersonationRecord {
	fn from(event: ImpersonationEvent) -> Self {
		match (event.is_impersonating, event.organization_id) {
			(true, Some(org_id)) => Self::active(ImpersonationTarget::new(org_id)),
			_ => Self::inactive(),
		}
	}
}

/// Starts and stops impersonation.
pub struct ImpersonationController {
	storage: Arc<dyn SessionStorage>,
	key: String,
	events: broadcast::Sender<ImpersonationEvent>,
}

impl std::fmt::Debug for ImpersonationController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ImpersonationController")
			.field("key", &self.key)
			.field("subscribers", &self.events.receiver_count())
			.finish()
	}
}

impl ImpersonationController {
	pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
		let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
		Self {
			storage,
			key: key.into(),
			events,
		}
	}

	pub fn from_config(storage: Arc<dyn SessionStorage>, config: &AccessConfig) -> Self {
		Self::new(storage, config.impersonation_storage_key.clone())
	}

	pub fn with_default_key(storage: Arc<dyn SessionStorage>) -> Self {
		Self::new(storage, DEFAULT_IMPERSONATION_STORAGE_KEY)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ImpersonationEvent> {
		self.events.subscribe()
	}

	/// Reads the persisted record.
	///
	/// Missing, unreadable or corrupt records count as not impersonating.
	pub fn current(&self) -> ImpersonationRecord {
		let raw = match self.storage.get(&self.key) {
			Ok(Some(raw)) => raw,
			Ok(None) => return ImpersonationRecord::inactive(),
			Err(e) => {
				tracing::warn!(error = %e, "failed to read impersonation record");
				return ImpersonationRecord::inactive();
			}
		};
		match serde_json::from_str(&raw) {
			Ok(record) => record,
			Err(e) => {
				tracing::warn!(error = %e, "ignoring corrupt impersonation record");
				ImpersonationRecord::inactive()
			}
		}
	}

	/// Starts acting as `target`. Only platform operators may impersonate.
	#[instrument(skip(self, actor, target), fields(organization_id = %target.organization_id))]
	pub fn start(
		&self,
		actor: &SubjectRoles,
		target: ImpersonationTarget,
	) -> Result<ImpersonationRecord> {
		if !actor.is_platform_operator() {
			tracing::warn!("impersonation refused for non-operator");
			return Err(TenantError::NotPlatformOperator);
		}

		let record = ImpersonationRecord::active(target);
		self.storage
			.set(&self.key, serde_json::to_string(&record)?)?;
		tracing::info!("impersonation started");
		self.publish(&record);
		Ok(record)
	}

	/// Stops impersonating. Stopping when inactive is a no-op that still
	/// publishes an event.
	#[instrument(skip(self))]
	pub fn stop(&self) -> Result<()> {
		self.storage.remove(&self.key)?;
		tracing::info!("impersonation stopped");
		self.publish(&ImpersonationRecord::inactive());
		Ok(())
	}

	fn publish(&self, record: &ImpersonationRecord) {
		// No subscribers is fine.
		let _ = self.events.send(ImpersonationEvent::from(record));
	}
}
