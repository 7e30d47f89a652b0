// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! System role repository.
//!
//! System roles live in their own global table and are never tied to an
//! organization.

use chrono::Utc;
use ledgr_auth::{SystemRole, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

#[derive(Clone)]
pub struct SystemRoleRepository {
	pool: SqlitePool,
}

impl SystemRoleRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Grant `role` to a user, replacing any existing system role.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role = %role))]
	pub async fn grant(&self, user_id: &UserId, role: SystemRole) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO system_roles (user_id, role, granted_at)
			VALUES (?, ?, ?)
			ON CONFLICT (user_id) DO UPDATE SET role = excluded.role, granted_at = excluded.granted_at
			"#,
		)
		.bind(user_id.to_string())
		.bind(role.as_str())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::info!(user_id = %user_id, role = %role, "system role granted");
		Ok(())
	}

	/// Revoke a user's system role. Returns true if one was held.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn revoke(&self, user_id: &UserId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM system_roles WHERE user_id = ?")
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;

		let revoked = result.rows_affected() > 0;
		if revoked {
			tracing::info!(user_id = %user_id, "system role revoked");
		}
		Ok(revoked)
	}

	/// The user's system role, if any.
	///
	/// Accepts legacy role names such as `super_admin`; an unrecognised
	/// stored value counts as no role.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get(&self, user_id: &UserId) -> Result<Option<SystemRole>, DbError> {
		let row = sqlx::query("SELECT role FROM system_roles WHERE user_id = ?")
			.bind(user_id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.and_then(|r| {
			let role: String = r.get("role");
			let parsed = role.parse::<SystemRole>().ok();
			if parsed.is_none() {
				tracing::warn!(role, "ignoring unknown system role");
			}
			parsed
		}))
	}

	/// Every user holding `role`.
	#[tracing::instrument(skip(self), fields(role = %role))]
	pub async fn list_holders(&self, role: SystemRole) -> Result<Vec<UserId>, DbError> {
		let rows = sqlx::query("SELECT user_id FROM system_roles WHERE role = ? ORDER BY granted_at")
			.bind(role.as_str())
			.fetch_all(&self.pool)
			.await?;

		rows
			.iter()
			.map(|r| {
				let id: String = r.get("user_id");
				id.parse::<UserId>().map_err(DbError::from)
			})
			.collect()
	}
}
