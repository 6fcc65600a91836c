// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Document model configuration options

/// How a cursor reacts when its container was changed behind its back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CursorSyncPolicy {
    /// Re-locate the last returned element through its element index
    #[default]
    Heal,
    /// Report any detected change as a desync error
    FailFast,
}

/// Configuration for a [`Dom`](crate::Dom) arena
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomConfig {
    /// Cursor behaviour after uncoordinated structural mutation
    pub cursor_sync: CursorSyncPolicy,

    /// Audit element indices after every structural mutation
    pub verify_invariants: bool,

    /// Number of node slots reserved up front
    pub initial_arena_capacity: usize,
}

impl DomConfig {
    /// Create a new configuration with custom settings
    pub fn new(
        cursor_sync: CursorSyncPolicy,
        verify_invariants: bool,
        initial_arena_capacity: usize,
    ) -> Self {
        Self {
            cursor_sync,
            verify_invariants,
            initial_arena_capacity,
        }
    }

    /// Always audit indices, heal cursors
    pub fn strict() -> Self {
        Self {
            cursor_sync: CursorSyncPolicy::Heal,
            verify_invariants: true,
            initial_arena_capacity: 64,
        }
    }

    /// Cursors fail on any detected change instead of rescanning
    pub fn fail_fast() -> Self {
        Self {
            cursor_sync: CursorSyncPolicy::FailFast,
            ..Self::default()
        }
    }

    /// Create a configuration for testing
    pub fn testing() -> Self {
        Self {
            cursor_sync: CursorSyncPolicy::Heal,
            verify_invariants: true,
            initial_arena_capacity: 8,
        }
    }
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            cursor_sync: CursorSyncPolicy::Heal,
            verify_invariants: cfg!(debug_assertions),
            initial_arena_capacity: 64,
        }
    }
}
