// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod access;
mod database;
mod logging;

pub use access::{
	AccessConfig, AccessConfigLayer, DEFAULT_ADMIN_ROUTE_PREFIX, DEFAULT_BUSINESS_TABLES,
	DEFAULT_IMPERSONATION_STORAGE_KEY,
};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
