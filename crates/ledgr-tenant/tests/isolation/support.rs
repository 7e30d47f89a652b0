// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use ledgr_auth::{OrgId, OrgRole, SubjectRoles, SystemRole, UserId};
use ledgr_config::AccessConfig;
use ledgr_tenant::{
	ClassifierInputs, DataSource, MemorySessionStorage, ScopedQuery, SessionContext, TenantAccess,
	TenantDataClient,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

/// One browser tab: storage, session access and a data client wired
/// together from the default access configuration.
pub struct TestSession {
	pub storage: Arc<MemorySessionStorage>,
	pub access: TenantAccess,
	pub client: TenantDataClient<Value>,
	pub inputs: ClassifierInputs,
}

impl TestSession {
	pub fn new(roles: SubjectRoles, route: &str) -> Self {
		let storage = Arc::new(MemorySessionStorage::new());
		let access = TenantAccess::from_config(&AccessConfig::default(), storage.clone(), None);
		let client = access.data_client();
		let mut this = Self {
			storage,
			access,
			client,
			inputs: ClassifierInputs::new(Some(UserId::generate()), roles, route),
		};
		this.refresh();
		this
	}

	pub fn operator(route: &str) -> Self {
		Self::new(SubjectRoles::system(SystemRole::PlatformOperator), route)
	}

	pub fn member(org: OrgId, role: OrgRole, route: &str) -> Self {
		Self::new(SubjectRoles::member(org, role), route)
	}

	/// Re-reads the impersonation record and reclassifies, as a page
	/// render would.
	pub fn refresh(&mut self) -> SessionContext {
		self.access.refresh(&mut self.inputs)
	}

	pub fn navigate(&mut self, route: &str) -> SessionContext {
		self.inputs.route = route.to_string();
		self.refresh()
	}

	pub fn context(&self) -> SessionContext {
		self.access.session().context()
	}
}

pub fn row(org: OrgId, id: u64) -> Value {
	json!({ "id": id, "organization_id": org.to_string() })
}

/// A source that parks every fetch until released.
#[derive(Default)]
pub struct GatedSource {
	pub rows: Vec<Value>,
	pub started: Notify,
	pub release: Notify,
	pub seen: Mutex<Vec<ScopedQuery>>,
}

impl GatedSource {
	pub fn with_rows(rows: Vec<Value>) -> Self {
		Self {
			rows,
			..Default::default()
		}
	}
}

#[async_trait]
impl DataSource<Value> for GatedSource {
	async fn fetch(&self, query: &ScopedQuery) -> ledgr_tenant::error::Result<Vec<Value>> {
		self.seen.lock().push(query.clone());
		self.started.notify_one();
		self.release.notified().await;
		Ok(self.rows.clone())
	}
}

/// A source that answers immediately with fixed rows.
pub struct StaticSource(pub Vec<Value>);

#[async_trait]
impl DataSource<Value> for StaticSource {
	async fn fetch(&self, _query: &ScopedQuery) -> ledgr_tenant::error::Result<Vec<Value>> {
		Ok(self.0.clone())
	}
}
