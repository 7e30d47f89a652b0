// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context generations.
//!
//! Every context switch advances the generation. A fetch records the
//! generation it started under and its result is only applied if no switch
//! happened in between.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A point in the sequence of session contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
	pub fn value(&self) -> u64 {
		self.0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Monotonic generation counter.
#[derive(Debug, Default)]
pub struct ContextGeneration(AtomicU64);

impl ContextGeneration {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current(&self) -> Generation {
		Generation(self.0.load(Ordering::Acquire))
	}

	/// Advances and returns the new generation.
	pub fn advance(&self) -> Generation {
		Generation(self.0.fetch_add(1, Ordering::AcqRel) + 1)
	}
}
