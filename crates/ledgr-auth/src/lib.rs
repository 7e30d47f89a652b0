// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role matrix, permission resolution and UI guards for Ledgr.
//!
//! This crate answers one question: may a subject perform an action on a
//! business module? It is a client-side hint layer; server-side policies
//! remain authoritative.
//!
//! - [`types`]: ids, roles, modules and actions
//! - [`matrix`]: the compiled `(module, action, role)` table
//! - [`overrides`]: persisted per-role toggles and their load state
//! - [`resolver`]: bypass rules, override tier and matrix lookup
//! - [`guard`]: declarative guards for UI fragments
//!
//! Every check fails closed: missing roles, unknown names and an unready
//! override tier all deny.

pub mod error;
pub mod guard;
pub mod matrix;
pub mod overrides;
pub mod resolver;
pub mod types;

pub use error::AuthError;
pub use guard::{ActionGuard, GuardRender};
pub use overrides::{
	MemoryOverrideStore, OverrideChange, OverrideState, OverrideStateKind, OverrideStore,
	PermissionKey, PermissionOverrides,
};
pub use resolver::{Decision, PermissionResolver};
pub use types::{
	Module, ModuleScope, OrgId, OrgMembership, OrgRole, PermissionAction, SubjectRoles, SystemRole,
	UserId,
};
