// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod impersonation;
mod operator;
mod permissions;
mod stale_fetch;
mod support;
