// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::types::OrgRole;

/// Errors raised by the auth crate.
///
/// Permission checks themselves never return these; they deny instead.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
	#[error("unknown {kind} '{value}'")]
	UnknownName { kind: &'static str, value: String },

	#[error("invalid {kind} '{value}'")]
	InvalidId { kind: &'static str, value: String },

	#[error("role '{0}' cannot be overridden")]
	NotOverridable(OrgRole),

	#[error("permission override store is not configured")]
	StoreNotConfigured,

	#[error("permission overrides did not load within {0:?}")]
	LoadTimeout(std::time::Duration),

	#[error("permission override store error: {0}")]
	Store(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
