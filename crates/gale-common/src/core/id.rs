// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable vertex identifier (64 bits).
///
/// Opaque to the engine: unique per vertex, stable for the graph's lifetime,
/// and used as the sharding key when vertices are spread across workers.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct VertexId(u64);

impl VertexId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(val: u64) -> Self {
        Self(val)
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId({})", self.0)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VertexId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: u64 = s
            .parse()
            .map_err(|e| anyhow!("Invalid vertex id '{}': {}", s, e))?;
        Ok(Self(raw))
    }
}
