// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for access control.
//!
//! This module defines the foundational types used throughout Ledgr:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs ([`UserId`], [`OrgId`])
//! - **Role enums**: the platform-wide [`SystemRole`] and the ordered
//!   per-organization [`OrgRole`]
//! - **Permission vocabulary**: the closed [`Module`] and [`PermissionAction`]
//!   enumerations the role matrix is keyed on
//! - **Subject facts**: [`OrgMembership`] and [`SubjectRoles`]
//!
//! Every enum has a stable snake_case string form used for serde, `Display`
//! and `FromStr`. Parsing an unknown name is an error, never a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AuthError;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = AuthError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Uuid::parse_str(s.trim())
					.map(Self)
					.map_err(|_| AuthError::InvalidId {
						kind: stringify!($name),
						value: s.to_string(),
					})
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(OrgId, "Unique identifier for an organization (tenant).");

/// Generates `all()`, `as_str()`, `Display` and `FromStr` for a closed,
/// snake_case-named enum. Names after `|` are accepted when parsing but
/// never produced.
macro_rules! define_named_enum {
	($name:ident, $kind:expr, { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
		impl $name {
			/// Returns every variant, in declaration order.
			pub fn all() -> &'static [$name] {
				&[$($name::$variant),+]
			}

			/// Stable string form.
			pub fn as_str(&self) -> &'static str {
				match self {
					$($name::$variant => $text),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = AuthError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s.trim() {
					$($text $(| $alias)* => Ok($name::$variant),)+
					other => Err(AuthError::UnknownName {
						kind: $kind,
						value: other.to_string(),
					}),
				}
			}
		}
	};
}

// =============================================================================
// System Roles
// =============================================================================

/// Platform-wide role, held outside any organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
	/// Operates the super-admin console; may impersonate tenants.
	#[serde(alias = "super_admin")]
	PlatformOperator,
}

define_named_enum!(SystemRole, "system role", {
	PlatformOperator => "platform_operator" | "super_admin",
});

// =============================================================================
// Organization Roles
// =============================================================================

/// Roles within an organization, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
	/// Full control of the organization; bypasses the role matrix.
	Owner,
	/// Runs day-to-day operations: people, products, customers.
	Manager,
	/// Finance: invoices, payments, payroll, billing.
	Accounts,
	/// Standard member access.
	Staff,
}

define_named_enum!(OrgRole, "organization role", {
	Owner => "owner",
	Manager => "manager",
	Accounts => "accounts",
	Staff => "staff",
});

impl OrgRole {
	/// Position in the hierarchy; higher is more privileged.
	pub fn rank(&self) -> u8 {
		match self {
			OrgRole::Owner => 4,
			OrgRole::Manager => 3,
			OrgRole::Accounts => 2,
			OrgRole::Staff => 1,
		}
	}

	/// Returns true if this role ranks at least as high as `other`.
	pub fn has_permission_of(&self, other: &OrgRole) -> bool {
		self.rank() >= other.rank()
	}
}

// =============================================================================
// Modules and Actions
// =============================================================================

/// Which surface a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleScope {
	/// Per-organization business data.
	Tenant,
	/// Super-admin console.
	Platform,
}

/// Business areas that permissions are granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
	Dashboard,
	Customers,
	Invoices,
	Quotations,
	Payments,
	Expenses,
	Products,
	Employees,
	Attendance,
	Payroll,
	Billing,
	Reports,
	Settings,
	Users,
	Organizations,
	Subscriptions,
	PlatformSettings,
}

define_named_enum!(Module, "module", {
	Dashboard => "dashboard",
	Customers => "customers",
	Invoices => "invoices",
	Quotations => "quotations",
	Payments => "payments",
	Expenses => "expenses",
	Products => "products",
	Employees => "employees",
	Attendance => "attendance",
	Payroll => "payroll",
	Billing => "billing",
	Reports => "reports",
	Settings => "settings",
	Users => "users",
	Organizations => "organizations",
	Subscriptions => "subscriptions",
	PlatformSettings => "platform_settings",
});

impl Module {
	pub fn scope(&self) -> ModuleScope {
		match self {
			Module::Organizations | Module::Subscriptions | Module::PlatformSettings => {
				ModuleScope::Platform
			}
			_ => ModuleScope::Tenant,
		}
	}

	pub fn is_tenant(&self) -> bool {
		self.scope() == ModuleScope::Tenant
	}

	/// Tenant modules only.
	pub fn tenant_modules() -> impl Iterator<Item = Module> {
		Module::all().iter().copied().filter(Module::is_tenant)
	}
}

/// Operations that can be performed within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
	View,
	Create,
	Edit,
	Delete,
}

define_named_enum!(PermissionAction, "action", {
	View => "view",
	Create => "create",
	Edit => "edit",
	Delete => "delete",
});

// =============================================================================
// Subject facts
// =============================================================================

/// A user's role within one organization.
///
/// An [`OrgRole`] is only ever carried together with its organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgMembership {
	pub org_id: OrgId,
	pub role: OrgRole,
}

impl OrgMembership {
	pub fn new(org_id: OrgId, role: OrgRole) -> Self {
		Self { org_id, role }
	}
}

/// The role facts the permission resolver decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRoles {
	pub system_role: Option<SystemRole>,
	pub membership: Option<OrgMembership>,
}

impl SubjectRoles {
	/// A subject with no roles at all. Every non-trivial check denies.
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// A tenant member.
	pub fn member(org_id: OrgId, role: OrgRole) -> Self {
		Self {
			system_role: None,
			membership: Some(OrgMembership::new(org_id, role)),
		}
	}

	/// A platform-level subject with no membership.
	pub fn system(role: SystemRole) -> Self {
		Self {
			system_role: Some(role),
			membership: None,
		}
	}

	pub fn is_platform_operator(&self) -> bool {
		self.system_role == Some(SystemRole::PlatformOperator)
	}

	pub fn org_role(&self) -> Option<OrgRole> {
		self.membership.map(|m| m.role)
	}

	pub fn org_id(&self) -> Option<OrgId> {
		self.membership.map(|m| m.org_id)
	}

	pub fn is_owner(&self) -> bool {
		self.org_role() == Some(OrgRole::Owner)
	}
}
