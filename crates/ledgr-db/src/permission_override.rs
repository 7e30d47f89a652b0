// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission override repository.
//!
//! Backs the dynamic tier of permission resolution. Rows are keyed by
//! `(module, action, role)` using the snake_case names of `ledgr-auth`.

use async_trait::async_trait;
use chrono::Utc;
use ledgr_auth::{
	AuthError, Module, OrgRole, OverrideStore, PermissionAction, PermissionKey, PermissionOverrides,
};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// Repository for permission override database operations.
#[derive(Clone)]
pub struct PermissionOverrideRepository {
	pool: SqlitePool,
}

impl PermissionOverrideRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load every stored override.
	///
	/// Rows naming a module, action or role that no longer exists are
	/// skipped with a warning.
	#[tracing::instrument(skip(self))]
	pub async fn list_overrides(&self) -> Result<PermissionOverrides, DbError> {
		let rows = sqlx::query("SELECT module, action, role, allowed FROM permission_overrides")
			.fetch_all(&self.pool)
			.await?;

		let mut overrides = PermissionOverrides::new();
		for row in rows {
			let module: String = row.get("module");
			let action: String = row.get("action");
			let role: String = row.get("role");
			let allowed: i64 = row.get("allowed");

			match parse_key(&module, &action, &role) {
				Ok(key) => overrides.insert(key, allowed != 0),
				Err(e) => {
					tracing::warn!(module, action, role, error = %e, "skipping unknown permission override");
				}
			}
		}

		tracing::debug!(count = overrides.len(), "permission overrides listed");
		Ok(overrides)
	}

	/// Create or replace an override.
	///
	/// # Errors
	/// Returns `DbError::Auth` for owner keys.
	#[tracing::instrument(skip(self), fields(key = %key))]
	pub async fn upsert_override(&self, key: PermissionKey, allowed: bool) -> Result<(), DbError> {
		key.ensure_overridable()?;
		sqlx::query(
			r#"
			INSERT INTO permission_overrides (module, action, role, allowed, updated_at)
			VALUES (?, ?, ?, ?, ?)
			ON CONFLICT (module, action, role)
			DO UPDATE SET allowed = excluded.allowed, updated_at = excluded.updated_at
			"#,
		)
		.bind(key.module.as_str())
		.bind(key.action.as_str())
		.bind(key.role.as_str())
		.bind(allowed as i32)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(allowed, "permission override stored");
		Ok(())
	}

	/// Delete an override. Returns true if a row was removed.
	#[tracing::instrument(skip(self), fields(key = %key))]
	pub async fn delete_override(&self, key: PermissionKey) -> Result<bool, DbError> {
		let result = sqlx::query(
			"DELETE FROM permission_overrides WHERE module = ? AND action = ? AND role = ?",
		)
		.bind(key.module.as_str())
		.bind(key.action.as_str())
		.bind(key.role.as_str())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}
}

fn parse_key(module: &str, action: &str, role: &str) -> Result<PermissionKey, AuthError> {
	Ok(PermissionKey::new(
		module.parse::<Module>()?,
		action.parse::<PermissionAction>()?,
		role.parse::<OrgRole>()?,
	))
}

#[async_trait]
impl OverrideStore for PermissionOverrideRepository {
	async fn load_overrides(&self) -> Result<PermissionOverrides, AuthError> {
		Ok(self.list_overrides().await?)
	}

	async fn put_override(&self, key: PermissionKey, allowed: bool) -> Result<(), AuthError> {
		Ok(self.upsert_override(key, allowed).await?)
	}

	async fn delete_override(&self, key: PermissionKey) -> Result<bool, AuthError> {
		Ok(PermissionOverrideRepository::delete_override(self, key).await?)
	}
}
