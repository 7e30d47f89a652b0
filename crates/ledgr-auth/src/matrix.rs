// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compiled role matrix.
//!
//! The matrix is an exhaustive `match` over every `(Module, PermissionAction)`
//! pair, so adding a module or action without granting it is a build error.
//! Lookups are pure and never fail; anything that cannot be looked up denies.

use crate::types::{Module, ModuleScope, OrgRole, PermissionAction, SystemRole};

use crate::types::OrgRole::{Accounts, Manager, Owner, Staff};

const ALL: &[OrgRole] = &[Owner, Manager, Accounts, Staff];
const OWNER: &[OrgRole] = &[Owner];
const OWNER_MANAGER: &[OrgRole] = &[Owner, Manager];
const OWNER_ACCOUNTS: &[OrgRole] = &[Owner, Accounts];
const OFFICE: &[OrgRole] = &[Owner, Manager, Accounts];
const NONE: &[OrgRole] = &[];

/// Organization roles granted `action` on `module` by the compiled matrix.
pub fn org_grants(module: Module, action: PermissionAction) -> &'static [OrgRole] {
	use PermissionAction::{Create, Delete, Edit, View};

	match (module, action) {
		(Module::Dashboard, View) => ALL,
		(Module::Dashboard, Create | Edit | Delete) => OWNER,

		(Module::Customers, View | Create) => ALL,
		(Module::Customers, Edit) => OFFICE,
		(Module::Customers, Delete) => OWNER_MANAGER,

		(Module::Invoices, View | Create) => ALL,
		(Module::Invoices, Edit) => OFFICE,
		(Module::Invoices, Delete) => OWNER,

		(Module::Quotations, View | Create) => ALL,
		(Module::Quotations, Edit) => OFFICE,
		(Module::Quotations, Delete) => OWNER_MANAGER,

		(Module::Payments, View | Create) => OFFICE,
		(Module::Payments, Edit) => OWNER_ACCOUNTS,
		(Module::Payments, Delete) => OWNER,

		(Module::Expenses, View) => OFFICE,
		(Module::Expenses, Create) => ALL,
		(Module::Expenses, Edit) => OFFICE,
		(Module::Expenses, Delete) => OWNER,

		(Module::Products, View) => ALL,
		(Module::Products, Create | Edit | Delete) => OWNER_MANAGER,

		(Module::Employees, View | Create | Edit) => OWNER_MANAGER,
		(Module::Employees, Delete) => OWNER,

		(Module::Attendance, View | Create) => ALL,
		(Module::Attendance, Edit | Delete) => OWNER_MANAGER,

		(Module::Payroll, View | Create | Edit) => OWNER_ACCOUNTS,
		(Module::Payroll, Delete) => OWNER,

		(Module::Billing, View) => OWNER_ACCOUNTS,
		(Module::Billing, Create | Edit | Delete) => OWNER,

		(Module::Reports, View | Create) => OFFICE,
		(Module::Reports, Edit | Delete) => OWNER,

		(Module::Settings, View) => OWNER_MANAGER,
		(Module::Settings, Create | Edit | Delete) => OWNER,

		(Module::Users, View | Create) => OWNER_MANAGER,
		(Module::Users, Edit | Delete) => OWNER,

		(Module::Organizations | Module::Subscriptions | Module::PlatformSettings, _) => NONE,
	}
}

/// Returns true if `role` is granted `action` on `module` by the compiled matrix.
pub fn is_allowed(module: Module, action: PermissionAction, role: OrgRole) -> bool {
	org_grants(module, action).contains(&role)
}

/// System-role table for the super-admin console.
///
/// The platform operator manages every platform module and can view tenant
/// modules. The permission resolver bypasses this table for operators; it is
/// consulted directly by console surfaces that list capabilities.
pub fn system_is_allowed(module: Module, action: PermissionAction, role: SystemRole) -> bool {
	match (role, module.scope()) {
		(SystemRole::PlatformOperator, ModuleScope::Platform) => true,
		(SystemRole::PlatformOperator, ModuleScope::Tenant) => action == PermissionAction::View,
	}
}

/// String form of [`is_allowed`]. Unknown names deny.
pub fn is_allowed_str(module: &str, action: &str, role: &str) -> bool {
	match (module.parse(), action.parse(), role.parse()) {
		(Ok(module), Ok(action), Ok(role)) => is_allowed(module, action, role),
		_ => false,
	}
}

/// Every `(module, action, role, allowed)` row of the compiled matrix.
pub fn entries() -> impl Iterator<Item = (Module, PermissionAction, OrgRole, bool)> {
	Module::all().iter().flat_map(|&module| {
		PermissionAction::all().iter().flat_map(move |&action| {
			OrgRole::all()
				.iter()
				.map(move |&role| (module, action, role, is_allowed(module, action, role)))
		})
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::collections::HashSet;

	fn arb_module() -> impl Strategy<Value = Module> {
		proptest::sample::select(Module::all().to_vec())
	}

	fn arb_action() -> impl Strategy<Value = PermissionAction> {
		proptest::sample::select(PermissionAction::all().to_vec())
	}

	fn arb_org_role() -> impl Strategy<Value = OrgRole> {
		proptest::sample::select(OrgRole::all().to_vec())
	}

	/// Golden copy of the reference matrix: (module, [view, create, edit, delete]).
	/// Each cell lists role initials: o=owner m=manager a=accounts s=staff.
	const GOLDEN: &[(&str, [&str; 4])] = &[
		("dashboard", ["omas", "o", "o", "o"]),
		("customers", ["omas", "omas", "oma", "om"]),
		("invoices", ["omas", "omas", "oma", "o"]),
		("quotations", ["omas", "omas", "oma", "om"]),
		("payments", ["oma", "oma", "oa", "o"]),
		("expenses", ["oma", "omas", "oma", "o"]),
		("products", ["omas", "om", "om", "om"]),
		("employees", ["om", "om", "om", "o"]),
		("attendance", ["omas", "omas", "om", "om"]),
		("payroll", ["oa", "oa", "oa", "o"]),
		("billing", ["oa", "o", "o", "o"]),
		("reports", ["oma", "oma", "o", "o"]),
		("settings", ["om", "o", "o", "o"]),
		("users", ["om", "om", "o", "o"]),
		("organizations", ["", "", "", ""]),
		("subscriptions", ["", "", "", ""]),
		("platform_settings", ["", "", "", ""]),
	];

	fn initial(role: OrgRole) -> char {
		match role {
			OrgRole::Owner => 'o',
			OrgRole::Manager => 'm',
			OrgRole::Accounts => 'a',
			OrgRole::Staff => 's',
		}
	}

	#[test]
	fn matrix_matches_golden_table() {
		assert_eq!(GOLDEN.len(), Module::all().len());
		for (module_name, cells) in GOLDEN {
			let module: Module = module_name.parse().unwrap();
			for (action, cell) in PermissionAction::all().iter().zip(cells.iter()) {
				for role in OrgRole::all() {
					assert_eq!(
						is_allowed(module, *action, *role),
						cell.contains(initial(*role)),
						"{module}.{action} for {role}"
					);
				}
			}
		}
	}

	#[test]
	fn matrix_is_complete() {
		let rows: HashSet<_> = entries().map(|(m, a, r, _)| (m, a, r)).collect();
		assert_eq!(
			rows.len(),
			Module::all().len() * PermissionAction::all().len() * OrgRole::all().len()
		);
	}

	#[test]
	fn staff_cannot_delete_invoices() {
		assert!(!is_allowed(Module::Invoices, PermissionAction::Delete, OrgRole::Staff));
		assert!(is_allowed(Module::Invoices, PermissionAction::Delete, OrgRole::Owner));
	}

	#[test]
	fn owner_is_granted_every_tenant_cell() {
		for module in Module::tenant_modules() {
			for action in PermissionAction::all() {
				assert!(is_allowed(module, *action, OrgRole::Owner), "{module}.{action}");
			}
		}
	}

	#[test]
	fn string_lookup_denies_unknown_names() {
		assert!(is_allowed_str("invoices", "view", "staff"));
		assert!(!is_allowed_str("invoices", "approve", "owner"));
		assert!(!is_allowed_str("warehouse", "view", "owner"));
		assert!(!is_allowed_str("invoices", "view", "intern"));
	}

	#[test]
	fn system_table_covers_console() {
		let op = SystemRole::PlatformOperator;
		assert!(system_is_allowed(Module::Organizations, PermissionAction::Delete, op));
		assert!(system_is_allowed(Module::Invoices, PermissionAction::View, op));
		assert!(!system_is_allowed(Module::Invoices, PermissionAction::Edit, op));
	}

	proptest! {
		#[test]
		fn org_roles_never_reach_platform_modules(
			module in arb_module(),
			action in arb_action(),
			role in arb_org_role(),
		) {
			if module.scope() == ModuleScope::Platform {
				prop_assert!(!is_allowed(module, action, role));
			}
		}

		#[test]
		fn owner_grants_are_a_superset(
			module in arb_module(),
			action in arb_action(),
			role in arb_org_role(),
		) {
			if is_allowed(module, action, role) {
				prop_assert!(is_allowed(module, action, OrgRole::Owner));
			}
		}
	}
}
