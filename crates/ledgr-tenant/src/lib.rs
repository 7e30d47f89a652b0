// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenant isolation for Ledgr.
//!
//! This crate decides which tenant a session is acting for and keeps every
//! data access inside that tenant:
//!
//! - [`route`] and [`context`] classify the session as tenant user or
//!   platform operator and publish the [`SessionContext`]
//! - [`impersonation`] lets a platform operator act as one organization
//! - [`query_guard`] injects and checks the organization id on every read
//!   and write
//! - [`client`] runs fetches through the guard, caches results per context
//!   and discards results that arrive after a context switch
//! - [`access`] wires all of the above for one session from configuration
//!
//! Every function takes the session context explicitly; nothing here reads
//! ambient state.

pub mod access;
pub mod cache;
pub mod client;
pub mod context;
pub mod error;
pub mod generation;
pub mod impersonation;
pub mod query;
pub mod query_guard;
pub mod route;
pub mod storage;

pub use access::{build_resolver, TenantAccess};
pub use cache::{CacheInvalidator, DataCache};
pub use client::{DataSource, FetchOutcome, TenantDataClient};
pub use context::{
	classify, AppContext, AppContextClassifier, ClassifierInputs, SessionContext, SessionHandle,
};
pub use error::TenantError;
pub use generation::{ContextGeneration, Generation};
pub use impersonation::{
	ImpersonationController, ImpersonationEvent, ImpersonationRecord, ImpersonationTarget,
};
pub use query::{Filter, FilterOp, OrderBy, QueryRequest, ScopedQuery};
pub use query_guard::{BusinessTables, OrgOwned, OrgQueryGuard, ORGANIZATION_ID_COLUMN};
pub use route::RouteClassifier;
pub use storage::{MemorySessionStorage, SessionStorage};
