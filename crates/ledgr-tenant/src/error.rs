// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Errors raised by the tenant isolation layer.
#[derive(Debug, thiserror::Error)]
pub enum TenantError {
	/// A business table was queried while business data access is blocked.
	#[error("query on business table '{table}' is not allowed in platform operator context")]
	ContextViolation { table: String },

	#[error("only platform operators can impersonate an organization")]
	NotPlatformOperator,

	#[error("session storage error: {0}")]
	Storage(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("data source error: {0}")]
	Source(String),
}

pub type Result<T> = std::result::Result<T, TenantError>;
