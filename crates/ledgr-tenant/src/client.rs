// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Guarded tenant data access.
//!
//! [`TenantDataClient::fetch`] is the only path from a [`QueryRequest`] to
//! cached tenant data:
//!
//! 1. Snapshot the session context and its generation.
//! 2. Scope the request with the org filter; blocked sessions stop here.
//! 3. Await the source, bounded by the configured timeout.
//! 4. Under the session read lock, check the generation is unchanged, drop
//!    records from other organizations and cache the rest. A result that
//!    started under an older generation is discarded.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ledgr_config::AccessConfig;
use tracing::instrument;

use crate::cache::DataCache;
use crate::context::SessionHandle;
use crate::error::Result;
use crate::query::{QueryRequest, ScopedQuery};
use crate::query_guard::{OrgOwned, OrgQueryGuard};

/// Where tenant data actually comes from.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
	async fn fetch(&self, query: &ScopedQuery) -> Result<Vec<T>>;
}

/// Result of a guarded fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
	/// Fetched, validated and cached.
	Fresh(Vec<T>),
	/// Served from the cache of the current context.
	Cached(Vec<T>),
	/// The context does not allow tenant data.
	Blocked,
	/// The context switched while the fetch was in flight.
	Discarded,
	/// The source did not answer in time.
	TimedOut,
}

impl<T> FetchOutcome<T> {
	/// Items to show; empty unless fresh or cached.
	pub fn into_items(self) -> Vec<T> {
		match self {
			FetchOutcome::Fresh(items) | FetchOutcome::Cached(items) => items,
			FetchOutcome::Blocked | FetchOutcome::Discarded | FetchOutcome::TimedOut => Vec::new(),
		}
	}

	pub fn is_applied(&self) -> bool {
		matches!(self, FetchOutcome::Fresh(_) | FetchOutcome::Cached(_))
	}
}

/// Fetches tenant data through the org-scoped query guard.
pub struct TenantDataClient<T> {
	session: SessionHandle,
	guard: OrgQueryGuard,
	cache: Arc<DataCache<T>>,
	timeout: Duration,
}

impl<T> TenantDataClient<T>
where
	T: OrgOwned + Clone + Send + Sync + 'static,
{
	/// Creates a client whose cache is cleared on every context switch.
	pub fn new(session: SessionHandle, guard: OrgQueryGuard, timeout: Duration) -> Self {
		let cache = Arc::new(DataCache::new());
		session.register_invalidator(cache.clone());
		Self {
			session,
			guard,
			cache,
			timeout,
		}
	}

	pub fn from_config(session: SessionHandle, config: &AccessConfig) -> Self {
		Self::new(
			session,
			OrgQueryGuard::from_config(config),
			config.fetch_timeout(),
		)
	}

	pub fn cache(&self) -> &DataCache<T> {
		&self.cache
	}

	pub fn guard(&self) -> &OrgQueryGuard {
		&self.guard
	}

	#[instrument(level = "debug", skip(self, source, request), fields(table = %request.table))]
	pub async fn fetch<S>(&self, source: &S, request: QueryRequest) -> Result<FetchOutcome<T>>
	where
		S: DataSource<T> + ?Sized,
	{
		let (context, generation) = self.session.snapshot();
		let Some(scoped) = self.guard.apply_org_filter(&context, request) else {
			tracing::debug!("fetch blocked by session context");
			return Ok(FetchOutcome::Blocked);
		};

		let key = scoped.cache_key();
		if let Some(items) = self
			.session
			.with_generation(generation, |_| self.cache.get(&key))
			.flatten()
		{
			return Ok(FetchOutcome::Cached(items));
		}

		let items = match tokio::time::timeout(self.timeout, source.fetch(&scoped)).await {
			Ok(result) => result?,
			Err(_) => {
				tracing::warn!(timeout = ?self.timeout, "tenant data fetch timed out");
				return Ok(FetchOutcome::TimedOut);
			}
		};

		let applied = self.session.with_generation(generation, |current| {
			let items = self.guard.validate_fetched_data(current, items);
			self.cache.insert(key, items.clone());
			items
		});

		match applied {
			Some(items) => Ok(FetchOutcome::Fresh(items)),
			None => {
				tracing::debug!(%generation, "discarding result from superseded context");
				Ok(FetchOutcome::Discarded)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{AppContext, SessionContext};
	use crate::error::TenantError;
	use ledgr_auth::OrgId;
	use parking_lot::Mutex;
	use serde_json::{json, Value};

	/// Returns canned rows and records every query it sees.
	#[derive(Default)]
	struct RecordingSource {
		rows: Vec<Value>,
		seen: Mutex<Vec<ScopedQuery>>,
	}

	#[async_trait]
	impl DataSource<Value> for RecordingSource {
		async fn fetch(&self, query: &ScopedQuery) -> Result<Vec<Value>> {
			self.seen.lock().push(query.clone());
			Ok(self.rows.clone())
		}
	}

	struct SlowSource;

	#[async_trait]
	impl DataSource<Value> for SlowSource {
		async fn fetch(&self, _query: &ScopedQuery) -> Result<Vec<Value>> {
			tokio::time::sleep(Duration::from_secs(60)).await;
			Ok(Vec::new())
		}
	}

	struct FailingSource;

	#[async_trait]
	impl DataSource<Value> for FailingSource {
		async fn fetch(&self, _query: &ScopedQuery) -> Result<Vec<Value>> {
			Err(TenantError::Source("503".into()))
		}
	}

	fn client_for(context: SessionContext) -> TenantDataClient<Value> {
		TenantDataClient::new(
			SessionHandle::new(context),
			OrgQueryGuard::default(),
			Duration::from_secs(1),
		)
	}

	fn tenant(org: OrgId) -> SessionContext {
		SessionContext {
			organization_id: Some(org),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn fresh_then_cached() {
		let org = OrgId::generate();
		let source = RecordingSource {
			rows: vec![
				json!({ "id": 1, "organization_id": org.to_string() }),
				json!({ "id": 2, "organization_id": OrgId::generate().to_string() }),
			],
			..Default::default()
		};
		let client = client_for(tenant(org));

		let first = client
			.fetch(&source, QueryRequest::table("invoices"))
			.await
			.unwrap();
		assert_eq!(first, FetchOutcome::Fresh(vec![source.rows[0].clone()]));

		let second = client
			.fetch(&source, QueryRequest::table("invoices"))
			.await
			.unwrap();
		assert!(matches!(second, FetchOutcome::Cached(ref items) if items.len() == 1));
		assert_eq!(source.seen.lock().len(), 1);
		assert_eq!(source.seen.lock()[0].organization_id(), org);
	}

	#[test]
	fn dropped_clients_do_not_accumulate_on_the_session() {
		let session = SessionHandle::new(tenant(OrgId::generate()));
		for _ in 0..1000 {
			let client: TenantDataClient<Value> =
				TenantDataClient::new(session.clone(), OrgQueryGuard::default(), Duration::from_secs(1));
			drop(client);
		}
		let live: TenantDataClient<Value> =
			TenantDataClient::new(session.clone(), OrgQueryGuard::default(), Duration::from_secs(1));
		assert_eq!(session.registered_invalidators(), 1);
		drop(live);
	}

	#[tokio::test]
	async fn console_session_is_blocked_before_the_source() {
		let source = RecordingSource::default();
		let client = client_for(SessionContext {
			app_context: AppContext::PlatformOperator,
			..Default::default()
		});
		let outcome = client
			.fetch(&source, QueryRequest::table("invoices"))
			.await
			.unwrap();
		assert_eq!(outcome, FetchOutcome::Blocked);
		assert!(source.seen.lock().is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn slow_source_times_out() {
		let client = client_for(tenant(OrgId::generate()));
		let outcome = client
			.fetch(&SlowSource, QueryRequest::table("invoices"))
			.await
			.unwrap();
		assert_eq!(outcome, FetchOutcome::TimedOut);
		assert!(client.cache().is_empty());
	}

	#[tokio::test]
	async fn source_errors_propagate() {
		let client = client_for(tenant(OrgId::generate()));
		let err = client
			.fetch(&FailingSource, QueryRequest::table("invoices"))
			.await
			.unwrap_err();
		assert!(matches!(err, TenantError::Source(_)));
	}

	#[test]
	fn non_applied_outcomes_yield_no_items() {
		assert!(FetchOutcome::<Value>::Discarded.into_items().is_empty());
		assert!(!FetchOutcome::<Value>::Blocked.is_applied());
		assert!(FetchOutcome::Cached(vec![json!({})]).is_applied());
	}
}
