// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use ledgr_auth::{OrgId, SubjectRoles, SystemRole};
use ledgr_tenant::{FetchOutcome, ImpersonationTarget, QueryRequest};

use super::support::{row, GatedSource, TestSession};

fn operator() -> SubjectRoles {
	SubjectRoles::system(SystemRole::PlatformOperator)
}

#[tokio::test]
async fn result_from_superseded_context_is_discarded() {
	let mut session = TestSession::operator("/super-admin");
	let a = OrgId::generate();
	let b = OrgId::generate();
	session
		.access
		.impersonation
		.start(&operator(), ImpersonationTarget::new(a))
		.unwrap();
	session.refresh();

	let rows = GatedSource::with_rows(vec![row(a, 1), row(a, 2)]);
	let source = &rows;
	let impersonation = &session.access.impersonation;
	let classifier = &session.access.classifier;
	let mut inputs = session.inputs.clone();

	let fetch = session.client.fetch(source, QueryRequest::table("invoices"));
	let switch = async move {
		source.started.notified().await;
		impersonation
			.start(&operator(), ImpersonationTarget::new(b))
			.unwrap();
		inputs.impersonation = impersonation.current();
		classifier.update(&inputs);
		source.release.notify_one();
	};
	let (outcome, ()) = tokio::join!(fetch, switch);

	assert_eq!(outcome.unwrap(), FetchOutcome::Discarded);
	assert!(session.client.cache().is_empty());
	assert_eq!(session.context().organization_id, Some(b));
}

#[tokio::test]
async fn result_from_current_context_is_applied() {
	let org = OrgId::generate();
	let session = TestSession::member(org, ledgr_auth::OrgRole::Staff, "/invoices");
	let source = GatedSource::with_rows(vec![row(org, 1), row(OrgId::generate(), 2)]);

	let fetch = session.client.fetch(&source, QueryRequest::table("invoices"));
	let release = async {
		source.started.notified().await;
		source.release.notify_one();
	};
	let (outcome, ()) = tokio::join!(fetch, release);

	let items = outcome.unwrap().into_items();
	assert_eq!(items, vec![row(org, 1)]);
	assert_eq!(session.client.cache().len(), 1);
}
