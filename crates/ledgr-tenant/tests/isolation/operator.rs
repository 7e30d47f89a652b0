// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ledgr_auth::{OrgId, SubjectRoles, SystemRole};
use ledgr_tenant::{
	AppContext, FetchOutcome, ImpersonationTarget, QueryRequest, TenantError,
	ORGANIZATION_ID_COLUMN,
};
use serde_json::json;

use super::support::{row, GatedSource, TestSession};

fn operator() -> SubjectRoles {
	SubjectRoles::system(SystemRole::PlatformOperator)
}

#[test]
fn operator_in_console_cannot_touch_invoices_until_impersonating() {
	let mut session = TestSession::operator("/super-admin/organizations");
	let context = session.context();
	assert_eq!(context.app_context, AppContext::PlatformOperator);

	let err = session
		.access
		.guard
		.assert_query_allowed(&context, "invoices")
		.unwrap_err();
	assert!(matches!(err, TenantError::ContextViolation { ref table } if table == "invoices"));
	assert!(session
		.access
		.guard
		.apply_org_filter(&context, QueryRequest::table("invoices"))
		.is_none());

	let x = OrgId::generate();
	session
		.access
		.impersonation
		.start(&operator(), ImpersonationTarget::new(x))
		.unwrap();
	let context = session.refresh();

	assert!(session.access.guard.assert_query_allowed(&context, "invoices").is_ok());
	let scoped = session
		.access
		.guard
		.apply_org_filter(&context, QueryRequest::table("invoices"))
		.unwrap();
	assert_eq!(scoped.organization_id(), x);
	let filters: Vec<_> = scoped.request().filters_on(ORGANIZATION_ID_COLUMN).collect();
	assert_eq!(filters.len(), 1);
	assert_eq!(filters[0].value, json!(x.to_string()));
}

#[test]
fn operator_outside_console_is_a_tenant_user_without_org() {
	let session = TestSession::operator("/dashboard");
	let context = session.context();
	assert_eq!(context.app_context, AppContext::TenantUser);
	assert!(session.access.guard.assert_query_allowed(&context, "invoices").is_ok());
	assert!(session
		.access
		.guard
		.apply_org_filter(&context, QueryRequest::table("invoices"))
		.is_none());
}

#[test]
fn platform_tables_stay_reachable_in_console() {
	let session = TestSession::operator("/super-admin");
	let context = session.context();
	for table in ["organizations", "subscriptions", "system_roles"] {
		assert!(session.access.guard.assert_query_allowed(&context, table).is_ok());
	}
}

#[tokio::test]
async fn console_fetch_never_reaches_the_source() {
	let session = TestSession::operator("/super-admin");
	let source = GatedSource::with_rows(vec![row(OrgId::generate(), 1)]);
	let outcome = session
		.client
		.fetch(&source, QueryRequest::table("invoices"))
		.await
		.unwrap();
	assert_eq!(outcome, FetchOutcome::Blocked);
	assert!(source.seen.lock().is_empty());
}
