// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Org-scoped query guard.
//!
//! Every tenant read and write passes through here. Requests get the
//! context's organization filter before they leave, results are checked
//! against it after they arrive, and nothing passes while the session is in
//! platform-operator mode.

use std::collections::HashSet;

use ledgr_auth::OrgId;
use ledgr_config::AccessConfig;
use serde_json::Value;
use tracing::instrument;

use crate::context::SessionContext;
use crate::error::{Result, TenantError};
use crate::query::{Filter, QueryRequest, ScopedQuery};

pub const ORGANIZATION_ID_COLUMN: &str = "organization_id";

/// A record that belongs to one organization.
pub trait OrgOwned {
	fn organization_id(&self) -> Option<OrgId>;
}

/// Reads the `organization_id` field of a JSON object.
impl OrgOwned for Value {
	fn organization_id(&self) -> Option<OrgId> {
		self.get(ORGANIZATION_ID_COLUMN)?.as_str()?.parse().ok()
	}
}

/// Tables whose rows belong to exactly one organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessTables(HashSet<String>);

impl BusinessTables {
	pub fn new<I, S>(tables: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(tables.into_iter().map(Into::into).collect())
	}

	pub fn from_config(config: &AccessConfig) -> Self {
		Self::new(config.business_tables.iter().cloned())
	}

	pub fn contains(&self, table: &str) -> bool {
		self.0.contains(table)
	}
}

/// Applies tenant isolation to requests and results.
#[derive(Debug, Clone)]
pub struct OrgQueryGuard {
	tables: BusinessTables,
}

impl OrgQueryGuard {
	pub fn new(tables: BusinessTables) -> Self {
		Self { tables }
	}

	pub fn from_config(config: &AccessConfig) -> Self {
		Self::new(BusinessTables::from_config(config))
	}

	pub fn business_tables(&self) -> &BusinessTables {
		&self.tables
	}

	/// Scopes `request` to the context's organization.
	///
	/// Returns `None` while blocking or when there is no organization. Any
	/// `organization_id` filter already on the request is replaced.
	pub fn apply_org_filter(
		&self,
		context: &SessionContext,
		mut request: QueryRequest,
	) -> Option<ScopedQuery> {
		let org_id = self.org_id_for_write(context)?;
		request.filters.retain(|f| f.column != ORGANIZATION_ID_COLUMN);
		request
			.filters
			.push(Filter::eq(ORGANIZATION_ID_COLUMN, org_id.to_string()));
		Some(ScopedQuery::new(request, org_id))
	}

	/// The organization id new records must carry, if writing is allowed.
	pub fn org_id_for_write(&self, context: &SessionContext) -> Option<OrgId> {
		if context.should_block_business_data() {
			return None;
		}
		context.organization_id
	}

	/// Keeps only items that belong to the context's organization.
	pub fn validate_fetched_data<T: OrgOwned>(
		&self,
		context: &SessionContext,
		items: Vec<T>,
	) -> Vec<T> {
		let Some(expected) = self.org_id_for_write(context) else {
			if !items.is_empty() {
				tracing::warn!(count = items.len(), "dropping data fetched without tenant scope");
			}
			return Vec::new();
		};

		items
			.into_iter()
			.filter(|item| match item.organization_id() {
				Some(found) if found == expected => true,
				found => {
					tracing::warn!(
						expected = %expected,
						found = ?found,
						"dropping record from another organization"
					);
					false
				}
			})
			.collect()
	}

	/// Fails with [`TenantError::ContextViolation`] for a business table
	/// while blocking. Non-business tables always pass.
	#[instrument(level = "debug", skip(self, context), fields(app_context = ?context.app_context))]
	pub fn assert_query_allowed(&self, context: &SessionContext, table: &str) -> Result<()> {
		if context.should_block_business_data() && self.tables.contains(table) {
			tracing::error!(table, "business table queried in platform operator context");
			return Err(TenantError::ContextViolation {
				table: table.to_string(),
			});
		}
		Ok(())
	}
}

impl Default for OrgQueryGuard {
	fn default() -> Self {
		Self::from_config(&AccessConfig::default())
	}
}
