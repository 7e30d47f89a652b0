// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ledgr_auth::{ActionGuard, GuardRender, Module, OrgId, OrgRole, PermissionResolver};
use ledgr_tenant::ImpersonationTarget;

use super::support::TestSession;

#[test]
fn session_subject_feeds_the_resolver() {
	let resolver = PermissionResolver::compiled();
	let org = OrgId::generate();

	let staff = TestSession::member(org, OrgRole::Staff, "/invoices").context().subject();
	let owner = TestSession::member(org, OrgRole::Owner, "/invoices").context().subject();

	assert!(!resolver.can_delete(&staff, Module::Invoices));
	assert!(resolver.can_delete(&owner, Module::Invoices));
	assert_eq!(
		ActionGuard::delete(Module::Invoices).evaluate(&resolver, &staff),
		GuardRender::Nothing
	);
}

#[test]
fn impersonating_operator_keeps_ui_bypass() {
	let resolver = PermissionResolver::compiled();
	let mut session = TestSession::operator("/super-admin");
	let subject = session.context().subject();
	session
		.access
		.impersonation
		.start(&subject, ImpersonationTarget::new(OrgId::generate()))
		.unwrap();

	let subject = session.refresh().subject();
	assert!(subject.is_platform_operator());
	assert!(resolver.can_delete(&subject, Module::Payroll));
}
