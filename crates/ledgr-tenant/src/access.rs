// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wires the access-control components of one session from configuration.

use std::sync::Arc;
use std::time::Duration;

use ledgr_auth::{OverrideStore, PermissionResolver};
use ledgr_config::AccessConfig;

use crate::client::TenantDataClient;
use crate::context::{AppContextClassifier, ClassifierInputs, SessionContext, SessionHandle};
use crate::error::Result;
use crate::impersonation::{ImpersonationController, ImpersonationTarget};
use crate::query_guard::{OrgOwned, OrgQueryGuard};
use crate::route::RouteClassifier;
use crate::storage::SessionStorage;

/// Builds the permission resolver.
///
/// Without a store, or with overrides disabled, the resolver uses the
/// compiled matrix only and is ready immediately.
pub fn build_resolver(
	config: &AccessConfig,
	overrides: Option<Arc<dyn OverrideStore>>,
) -> PermissionResolver {
	match overrides {
		Some(store) if config.overrides_enabled => {
			PermissionResolver::with_store(store).load_timeout(config.override_load_timeout())
		}
		_ => PermissionResolver::compiled(),
	}
}

/// The access-control components of one session.
pub struct TenantAccess {
	pub resolver: Arc<PermissionResolver>,
	pub impersonation: ImpersonationController,
	pub classifier: AppContextClassifier,
	pub guard: OrgQueryGuard,
	fetch_timeout: Duration,
}

impl TenantAccess {
	pub fn from_config(
		config: &AccessConfig,
		storage: Arc<dyn SessionStorage>,
		overrides: Option<Arc<dyn OverrideStore>>,
	) -> Self {
		Self {
			resolver: Arc::new(build_resolver(config, overrides)),
			impersonation: ImpersonationController::from_config(storage, config),
			classifier: AppContextClassifier::new(
				RouteClassifier::from_config(config),
				SessionHandle::default(),
			),
			guard: OrgQueryGuard::from_config(config),
			fetch_timeout: config.fetch_timeout(),
		}
	}

	pub fn session(&self) -> &SessionHandle {
		self.classifier.session()
	}

	/// Reads the persisted impersonation record into `inputs` and
	/// reclassifies the session.
	pub fn refresh(&self, inputs: &mut ClassifierInputs) -> SessionContext {
		inputs.impersonation = self.impersonation.current();
		self.classifier.update(inputs)
	}

	/// Starts acting as `target` for the subject in `inputs` and reclassifies
	/// before returning, so no fetch runs under the previous context.
	pub fn start_impersonation(
		&self,
		inputs: &mut ClassifierInputs,
		target: ImpersonationTarget,
	) -> Result<SessionContext> {
		self.impersonation.start(&inputs.roles, target)?;
		Ok(self.refresh(inputs))
	}

	/// Ends impersonation and reclassifies before returning. Tenant data of
	/// the former target is cleared and unreachable once this returns.
	pub fn stop_impersonation(&self, inputs: &mut ClassifierInputs) -> Result<SessionContext> {
		self.impersonation.stop()?;
		Ok(self.refresh(inputs))
	}

	/// A data client bound to this session's context and cache lifecycle.
	pub fn data_client<T>(&self) -> TenantDataClient<T>
	where
		T: OrgOwned + Clone + Send + Sync + 'static,
	{
		TenantDataClient::new(self.session().clone(), self.guard.clone(), self.fetch_timeout)
	}

	/// Performs the initial load of the permission override tier.
	pub async fn load_permissions(&self) -> ledgr_auth::error::Result<()> {
		self.resolver.load().await
	}
}
