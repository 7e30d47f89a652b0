// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative guards for UI fragments.
//!
//! A guard wraps a single `(module, action)` check. Presentation layers call
//! [`ActionGuard::render`] with whatever fragment type they use; the guard
//! itself holds no UI state.

use serde::{Deserialize, Serialize};

use crate::resolver::{Decision, PermissionResolver};
use crate::types::{Module, PermissionAction, SubjectRoles};

/// What a guarded fragment should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRender {
	/// The guarded children.
	Children,
	/// The fallback, when one is configured and the check is known-denied.
	Fallback,
	/// Nothing at all.
	Nothing,
}

/// Guard for one `(module, action)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGuard {
	pub module: Module,
	pub action: PermissionAction,
	has_fallback: bool,
}

impl ActionGuard {
	pub fn new(module: Module, action: PermissionAction) -> Self {
		Self {
			module,
			action,
			has_fallback: false,
		}
	}

	pub fn view(module: Module) -> Self {
		Self::new(module, PermissionAction::View)
	}

	pub fn create(module: Module) -> Self {
		Self::new(module, PermissionAction::Create)
	}

	pub fn edit(module: Module) -> Self {
		Self::new(module, PermissionAction::Edit)
	}

	pub fn delete(module: Module) -> Self {
		Self::new(module, PermissionAction::Delete)
	}

	/// Show a fallback when the check is known to be denied.
	pub fn with_fallback(mut self) -> Self {
		self.has_fallback = true;
		self
	}

	/// Decides what to render.
	///
	/// A pending check renders nothing, never the fallback, so a loading
	/// state cannot be mistaken for a denial. Operators and owners skip the
	/// wait through the resolver's bypass rules.
	pub fn evaluate(&self, resolver: &PermissionResolver, subject: &SubjectRoles) -> GuardRender {
		match resolver.resolve(subject, self.module, self.action) {
			Decision::Allowed => GuardRender::Children,
			Decision::Denied if self.has_fallback => GuardRender::Fallback,
			Decision::Denied | Decision::Pending => GuardRender::Nothing,
		}
	}

	/// Picks `children` or `fallback` according to [`Self::evaluate`].
	pub fn render<T>(
		&self,
		resolver: &PermissionResolver,
		subject: &SubjectRoles,
		children: T,
		fallback: Option<T>,
	) -> Option<T> {
		let guard = if fallback.is_some() {
			self.with_fallback()
		} else {
			*self
		};
		match guard.evaluate(resolver, subject) {
			GuardRender::Children => Some(children),
			GuardRender::Fallback => fallback,
			GuardRender::Nothing => None,
		}
	}
}
