// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Data-layer query descriptions.

use std::fmt;

use ledgr_auth::OrgId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
	Eq,
	Neq,
	In,
}

impl FilterOp {
	pub fn as_str(&self) -> &'static str {
		match self {
			FilterOp::Eq => "eq",
			FilterOp::Neq => "neq",
			FilterOp::In => "in",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
	pub column: String,
	pub op: FilterOp,
	pub value: Value,
}

impl Filter {
	pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			column: column.into(),
			op: FilterOp::Eq,
			value: value.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
	pub column: String,
	pub ascending: bool,
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
	pub table: String,
	#[serde(default)]
	pub columns: Vec<String>,
	#[serde(default)]
	pub filters: Vec<Filter>,
	#[serde(default)]
	pub order_by: Option<OrderBy>,
	#[serde(default)]
	pub limit: Option<u32>,
}

impl QueryRequest {
	pub fn table(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			columns: Vec::new(),
			filters: Vec::new(),
			order_by: None,
			limit: None,
		}
	}

	pub fn select<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	pub fn filter(mut self, filter: Filter) -> Self {
		self.filters.push(filter);
		self
	}

	pub fn filter_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
		self.filter(Filter::eq(column, value))
	}

	pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
		self.order_by = Some(OrderBy {
			column: column.into(),
			ascending,
		});
		self
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn filters_on<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Filter> + 'a {
		self.filters.iter().filter(move |f| f.column == column)
	}
}

/// Renders as `table?select=..&column=op.value&order=..&limit=..`.
impl fmt::Display for QueryRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}?select=", self.table)?;
		if self.columns.is_empty() {
			f.write_str("*")?;
		} else {
			f.write_str(&self.columns.join(","))?;
		}
		for filter in &self.filters {
			write!(f, "&{}={}.{}", filter.column, filter.op.as_str(), filter.value)?;
		}
		if let Some(order) = &self.order_by {
			let dir = if order.ascending { "asc" } else { "desc" };
			write!(f, "&order={}.{}", order.column, dir)?;
		}
		if let Some(limit) = self.limit {
			write!(f, "&limit={limit}")?;
		}
		Ok(())
	}
}

/// A request that carries the organization filter of the current context.
///
/// Only the org-scoped query guard constructs these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedQuery {
	request: QueryRequest,
	organization_id: OrgId,
}

impl ScopedQuery {
	pub(crate) fn new(request: QueryRequest, organization_id: OrgId) -> Self {
		Self {
			request,
			organization_id,
		}
	}

	pub fn request(&self) -> &QueryRequest {
		&self.request
	}

	pub fn organization_id(&self) -> OrgId {
		self.organization_id
	}

	pub fn table(&self) -> &str {
		&self.request.table
	}

	/// Cache key; the organization filter makes it unique per tenant.
	pub fn cache_key(&self) -> String {
		self.request.to_string()
	}

	pub fn into_request(self) -> QueryRequest {
		self.request
	}
}
