// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ledgr_auth::{OrgId, OrgRole, SubjectRoles, SystemRole};
use ledgr_tenant::{
	FetchOutcome, ImpersonationEvent, ImpersonationRecord, ImpersonationTarget, QueryRequest,
};

use super::support::{row, StaticSource, TestSession};

fn operator() -> SubjectRoles {
	SubjectRoles::system(SystemRole::PlatformOperator)
}

#[test]
fn start_then_stop_restores_blocking() {
	for route in ["/super-admin", "/super-admin/billing", "/invoices"] {
		let mut session = TestSession::operator(route);
		let before = session.context().should_block_business_data();

		session
			.access
			.impersonation
			.start(&operator(), ImpersonationTarget::new(OrgId::generate()))
			.unwrap();
		assert!(!session.refresh().should_block_business_data());

		session.access.impersonation.stop().unwrap();
		assert_eq!(session.refresh().should_block_business_data(), before, "{route}");
	}
}

#[test]
fn record_survives_reload_of_the_same_tab() {
	let mut session = TestSession::operator("/super-admin");
	let target = OrgId::generate();
	session
		.access
		.impersonation
		.start(&operator(), ImpersonationTarget::new(target).with_name("Acme"))
		.unwrap();

	// A reload rebuilds everything but the tab's storage.
	let reloaded = ledgr_tenant::ImpersonationController::with_default_key(session.storage.clone());
	assert_eq!(reloaded.current().organization_id(), Some(target));

	session.navigate("/super-admin/organizations");
	assert_eq!(session.context().organization_id, Some(target));
}

#[test]
fn context_switch_clears_cached_tenant_data() {
	let mut session = TestSession::operator("/super-admin");
	let org = OrgId::generate();
	session
		.access
		.impersonation
		.start(&operator(), ImpersonationTarget::new(org))
		.unwrap();
	let context = session.refresh();

	let scoped = session
		.access
		.guard
		.apply_org_filter(&context, QueryRequest::table("customers"))
		.unwrap();
	session.client.cache().insert(scoped.cache_key(), Vec::new());
	assert_eq!(session.client.cache().len(), 1);

	session.access.impersonation.stop().unwrap();
	session.refresh();
	assert!(session.client.cache().is_empty());
}

#[tokio::test]
async fn exiting_impersonation_blocks_the_next_fetch() {
	let mut session = TestSession::operator("/super-admin");
	let x = OrgId::generate();
	let source = StaticSource(vec![row(x, 1)]);

	let context = session
		.access
		.start_impersonation(&mut session.inputs, ImpersonationTarget::new(x))
		.unwrap();
	assert_eq!(context.organization_id, Some(x));
	let outcome = session
		.client
		.fetch(&source, QueryRequest::table("invoices"))
		.await
		.unwrap();
	assert_eq!(outcome, FetchOutcome::Fresh(vec![row(x, 1)]));

	let context = session.access.stop_impersonation(&mut session.inputs).unwrap();
	assert!(context.should_block_business_data());
	assert!(!session.access.impersonation.current().is_active());
	assert!(session.client.cache().is_empty());

	let outcome = session
		.client
		.fetch(&source, QueryRequest::table("invoices"))
		.await
		.unwrap();
	assert_eq!(outcome, FetchOutcome::Blocked);
}

#[test]
fn member_cannot_start_impersonation() {
	let own = OrgId::generate();
	let mut session = TestSession::member(own, OrgRole::Owner, "/dashboard");
	assert!(session
		.access
		.impersonation
		.start(
			&SubjectRoles::member(own, OrgRole::Owner),
			ImpersonationTarget::new(OrgId::generate()),
		)
		.is_err());
	assert_eq!(session.context().organization_id, Some(own));

	assert!(session
		.access
		.start_impersonation(&mut session.inputs, ImpersonationTarget::new(OrgId::generate()))
		.is_err());
	assert_eq!(session.context().organization_id, Some(own));
}

#[tokio::test]
async fn events_drive_the_classifier() {
	let mut session = TestSession::operator("/super-admin");
	let mut events = session.access.impersonation.subscribe();
	let target = OrgId::generate();

	session
		.access
		.impersonation
		.start(&operator(), ImpersonationTarget::new(target))
		.unwrap();
	let event: ImpersonationEvent = events.recv().await.unwrap();

	session.inputs.impersonation = ImpersonationRecord::from(event);
	let context = session.access.classifier.update(&session.inputs);
	assert!(context.is_impersonating);
	assert_eq!(context.organization_id, Some(target));
}
