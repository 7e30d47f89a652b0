// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for Ledgr access control.
//!
//! - [`PermissionOverrideRepository`]: the override tier of the permission
//!   resolver, implementing [`ledgr_auth::OverrideStore`]
//! - [`MembershipRepository`]: one role per user per organization
//! - [`SystemRoleRepository`]: platform-wide roles

pub mod error;
pub mod membership;
pub mod permission_override;
pub mod pool;
pub mod system_role;
pub mod testing;

pub use error::DbError;
pub use membership::MembershipRepository;
pub use permission_override::PermissionOverrideRepository;
pub use pool::{create_pool, run_migrations};
pub use system_role::SystemRoleRepository;
