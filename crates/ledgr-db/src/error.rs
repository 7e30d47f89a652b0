// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ledgr_auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error(transparent)]
	Auth(#[from] AuthError),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
	/// Maps unique-constraint violations to [`DbError::Conflict`].
	pub(crate) fn conflict_on_unique(err: sqlx::Error, what: impl Into<String>) -> Self {
		match &err {
			sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Conflict(what.into()),
			_ => DbError::Sqlx(err),
		}
	}
}

impl From<DbError> for AuthError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::Auth(inner) => inner,
			other => AuthError::Store(other.to_string()),
		}
	}
}
