// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! App-context classification.
//!
//! A session is either acting as a tenant user or as the platform operator
//! inside the super-admin console. Only the latter blocks business data:
//!
//! | system role | admin route | impersonating | context |
//! |---|---|---|---|
//! | operator | yes | no | `PlatformOperator` |
//! | anything else | | | `TenantUser` |
//!
//! An operator who leaves the console, or who impersonates a tenant, is
//! treated as a tenant user so the tenant's data is scoped correctly.

use std::sync::{Arc, Weak};

use ledgr_auth::{OrgId, OrgMembership, OrgRole, SubjectRoles, SystemRole, UserId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cache::CacheInvalidator;
use crate::generation::{ContextGeneration, Generation};
use crate::impersonation::ImpersonationRecord;
use crate::route::RouteClassifier;

/// Which side of the tenant boundary the session is acting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppContext {
	#[default]
	TenantUser,
	PlatformOperator,
}

impl AppContext {
	pub fn should_block_business_data(&self) -> bool {
		matches!(self, AppContext::PlatformOperator)
	}
}

/// Classifies a session. See the module docs for the table.
pub fn classify(
	system_role: Option<SystemRole>,
	route_is_admin: bool,
	is_impersonating: bool,
) -> AppContext {
	if system_role == Some(SystemRole::PlatformOperator) && route_is_admin && !is_impersonating {
		AppContext::PlatformOperator
	} else {
		AppContext::TenantUser
	}
}

/// The context every guard and data access is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
	pub app_context: AppContext,
	/// The organization reads and writes are scoped to.
	pub organization_id: Option<OrgId>,
	pub user_id: Option<UserId>,
	pub role: Option<OrgRole>,
	pub system_role: Option<SystemRole>,
	pub is_impersonating: bool,
}

impl SessionContext {
	/// A session with no user. Tenant context with no organization, so no
	/// business data can be scoped.
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn should_block_business_data(&self) -> bool {
		self.app_context.should_block_business_data()
	}

	/// Role facts for permission checks.
	pub fn subject(&self) -> SubjectRoles {
		SubjectRoles {
			system_role: self.system_role,
			membership: match (self.organization_id, self.role) {
				(Some(org_id), Some(role)) => Some(OrgMembership::new(org_id, role)),
				_ => None,
			},
		}
	}
}

/// Everything the classifier derives a context from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierInputs {
	pub user_id: Option<UserId>,
	pub roles: SubjectRoles,
	pub route: String,
	pub impersonation: ImpersonationRecord,
}

impl ClassifierInputs {
	pub fn new(user_id: Option<UserId>, roles: SubjectRoles, route: impl Into<String>) -> Self {
		Self {
			user_id,
			roles,
			route: route.into(),
			impersonation: ImpersonationRecord::inactive(),
		}
	}

	pub fn with_route(mut self, route: impl Into<String>) -> Self {
		self.route = route.into();
		self
	}

	pub fn with_impersonation(mut self, record: ImpersonationRecord) -> Self {
		self.impersonation = record;
		self
	}
}

struct SessionInner {
	context: RwLock<SessionContext>,
	generation: ContextGeneration,
	invalidators: RwLock<Vec<Weak<dyn CacheInvalidator>>>,
}

/// Shared handle to the current [`SessionContext`] and its generation.
///
/// The [`AppContextClassifier`] is the only writer.
#[derive(Clone)]
pub struct SessionHandle {
	inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionHandle")
			.field("context", &*self.inner.context.read())
			.field("generation", &self.inner.generation.current())
			.finish()
	}
}

impl Default for SessionHandle {
	fn default() -> Self {
		Self::new(SessionContext::anonymous())
	}
}

impl SessionHandle {
	pub fn new(context: SessionContext) -> Self {
		Self {
			inner: Arc::new(SessionInner {
				context: RwLock::new(context),
				generation: ContextGeneration::new(),
				invalidators: RwLock::new(Vec::new()),
			}),
		}
	}

	pub fn context(&self) -> SessionContext {
		self.inner.context.read().clone()
	}

	pub fn generation(&self) -> Generation {
		self.inner.generation.current()
	}

	/// The current context together with the generation it belongs to.
	pub fn snapshot(&self) -> (SessionContext, Generation) {
		let context = self.inner.context.read();
		(context.clone(), self.inner.generation.current())
	}

	/// Registers a cache to be cleared on every context switch.
	///
	/// The session holds it weakly; a dropped cache is unregistered on the
	/// next registration or switch.
	pub fn register_invalidator(&self, invalidator: Arc<dyn CacheInvalidator>) {
		let mut invalidators = self.inner.invalidators.write();
		invalidators.retain(|registered| registered.strong_count() > 0);
		invalidators.push(Arc::downgrade(&invalidator));
	}

	/// Number of registered caches, including dropped ones not yet pruned.
	pub fn registered_invalidators(&self) -> usize {
		self.inner.invalidators.read().len()
	}

	/// Runs `f` against the current context if it is still `expected`.
	///
	/// The context cannot switch while `f` runs.
	pub fn with_generation<R>(
		&self,
		expected: Generation,
		f: impl FnOnce(&SessionContext) -> R,
	) -> Option<R> {
		let context = self.inner.context.read();
		if self.inner.generation.current() != expected {
			return None;
		}
		Some(f(&context))
	}

	/// Clears caches, advances the generation and only then publishes `next`.
	/// Returns `None` if `next` equals the current context.
	fn switch(&self, next: SessionContext) -> Option<Generation> {
		let mut context = self.inner.context.write();
		if *context == next {
			return None;
		}
		self.inner
			.invalidators
			.write()
			.retain(|registered| match registered.upgrade() {
				Some(invalidator) => {
					invalidator.invalidate_all();
					true
				}
				None => false,
			});
		let generation = self.inner.generation.advance();
		*context = next;
		Some(generation)
	}
}

/// Derives the [`SessionContext`] and publishes it on change.
#[derive(Debug, Clone)]
pub struct AppContextClassifier {
	routes: RouteClassifier,
	session: SessionHandle,
}

impl AppContextClassifier {
	pub fn new(routes: RouteClassifier, session: SessionHandle) -> Self {
		Self { routes, session }
	}

	pub fn session(&self) -> &SessionHandle {
		&self.session
	}

	/// Computes the context for `inputs` without publishing it.
	///
	/// An impersonation record only counts for platform operators. The
	/// effective organization is the impersonation target while
	/// impersonating, none in platform-operator mode, and the membership's
	/// organization otherwise.
	pub fn derive(&self, inputs: &ClassifierInputs) -> SessionContext {
		let roles = &inputs.roles;
		let is_impersonating = roles.is_platform_operator() && inputs.impersonation.is_active();
		let route_is_admin = self.routes.is_admin_route(&inputs.route);
		let app_context = classify(roles.system_role, route_is_admin, is_impersonating);

		let organization_id = if is_impersonating {
			inputs.impersonation.organization_id()
		} else if app_context.should_block_business_data() {
			None
		} else {
			roles.org_id()
		};

		SessionContext {
			app_context,
			organization_id,
			user_id: inputs.user_id,
			role: roles.org_role(),
			system_role: roles.system_role,
			is_impersonating,
		}
	}

	/// Recomputes the context and switches to it if anything changed.
	#[instrument(skip(self, inputs), fields(route = %inputs.route))]
	pub fn update(&self, inputs: &ClassifierInputs) -> SessionContext {
		let next = self.derive(inputs);
		if let Some(generation) = self.session.switch(next.clone()) {
			tracing::info!(
				app_context = ?next.app_context,
				organization_id = ?next.organization_id,
				is_impersonating = next.is_impersonating,
				%generation,
				"session context switched"
			);
		}
		next
	}
}
