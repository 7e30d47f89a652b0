// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization membership repository.
//!
//! A user holds at most one role per organization; the
//! `UNIQUE (org_id, user_id)` constraint enforces it.

use chrono::Utc;
use ledgr_auth::{OrgId, OrgMembership, OrgRole, SubjectRoles, UserId};
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use crate::error::DbError;
use crate::system_role::SystemRoleRepository;

#[derive(Clone)]
pub struct MembershipRepository {
	pool: SqlitePool,
}

impl MembershipRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Add a member to an organization.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the user is already a member.
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id, role = %role))]
	pub async fn add_member(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: OrgRole,
	) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			INSERT INTO org_memberships (id, org_id, user_id, role, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(Uuid::new_v4().to_string())
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.bind(role.as_str())
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await
		.map_err(|e| {
			DbError::conflict_on_unique(e, format!("user {user_id} is already a member of {org_id}"))
		})?;

		tracing::debug!("member added to organization");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id))]
	pub async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError> {
		let row = sqlx::query(
			"SELECT org_id, role FROM org_memberships WHERE org_id = ? AND user_id = ?",
		)
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_membership(&r)).transpose()
	}

	/// Change a member's role.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the user is not a member.
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id, role = %role))]
	pub async fn update_member_role(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: OrgRole,
	) -> Result<(), DbError> {
		let result = sqlx::query(
			"UPDATE org_memberships SET role = ?, updated_at = ? WHERE org_id = ? AND user_id = ?",
		)
		.bind(role.as_str())
		.bind(Utc::now().to_rfc3339())
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!(
				"user {user_id} is not a member of {org_id}"
			)));
		}
		tracing::debug!("member role updated");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id))]
	pub async fn remove_member(&self, org_id: &OrgId, user_id: &UserId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM org_memberships WHERE org_id = ? AND user_id = ?")
			.bind(org_id.to_string())
			.bind(user_id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Every organization the user belongs to.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OrgMembership>, DbError> {
		let rows = sqlx::query(
			"SELECT org_id, role FROM org_memberships WHERE user_id = ? ORDER BY created_at",
		)
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_membership).collect()
	}

	/// Role facts for `user_id` acting in `org_id`.
	///
	/// Combines the user's global system role with their membership in the
	/// given organization, if any.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, org_id = ?org_id))]
	pub async fn subject_roles(
		&self,
		user_id: &UserId,
		org_id: Option<&OrgId>,
	) -> Result<SubjectRoles, DbError> {
		let system_role = SystemRoleRepository::new(self.pool.clone())
			.get(user_id)
			.await?;
		let membership = match org_id {
			Some(org_id) => self.get_membership(org_id, user_id).await?,
			None => None,
		};
		Ok(SubjectRoles {
			system_role,
			membership,
		})
	}
}

fn row_to_membership(row: &sqlx::sqlite::SqliteRow) -> Result<OrgMembership, DbError> {
	let org_id: String = row.get("org_id");
	let role: String = row.get("role");
	Ok(OrgMembership::new(org_id.parse()?, role.parse()?))
}
