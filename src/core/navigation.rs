// Copyright 2025 Eric Jingryd (tidynest@proton.me)
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

//! Key-sequence navigation state machine
//!
//! The navigator walks the config tree one keypress at a time:
//!
//! ```text
//!            group key                 action key
//!   Idle ───────────────▶ InGroup ─────────────────▶ (execute) ─▶ Idle
//!    ▲                     │   ▲
//!    │        reset        │   │ group key (descend)
//!    └─────────────────────┘───┘
//! ```
//!
//! A key that matches nothing is a `Miss` and leaves the state untouched.
//!
//! The tree is shared (`Arc<Group>`) and never mutated here. The navigation
//! path is stored as child indices into that tree, so a reload that swaps
//! the root can never leave the path pointing into a half-built tree.

use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::core::keymap;
use crate::core::types::{Action, ActionOrGroup, Group};

/// Receives actions the navigator resolved.
///
/// How an action runs (spawning a process, opening a URL) is entirely up to
/// the implementation. Failures are reported back for logging only; they
/// never change navigation state.
pub trait ActionExecutor {
    fn execute(&mut self, action: &Action) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Result of feeding one key to the navigator
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Matched a group; the navigator is now one level deeper
    Descended {
        /// Index path of the group from the root
        path: Vec<usize>,
        /// Display glyph of the key that matched
        glyph: String,
    },
    /// Matched an action; the navigator is back at Idle
    Triggered {
        /// Index path of the action from the root
        path: Vec<usize>,
        action: Action,
        /// Whether the action was handed to the executor
        executed: bool,
    },
    /// No child of the current group is bound to the key
    Miss {
        /// Display glyph of the key that missed
        glyph: String,
    },
}

impl KeyOutcome {
    pub fn is_miss(&self) -> bool {
        matches!(self, KeyOutcome::Miss { .. })
    }
}

/// Navigation position: empty path means Idle at the root
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NavigationState {
    /// Child indices from the root down to the current group
    pub path: Vec<usize>,
    /// What the overlay should show for the last accepted key
    pub display: Option<String>,
}

impl NavigationState {
    pub fn is_idle(&self) -> bool {
        self.path.is_empty()
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.display = None;
    }
}

/// Walks a config tree keypress by keypress
#[derive(Debug)]
pub struct Navigator {
    root: Arc<Group>,
    state: NavigationState,
}

impl Navigator {
    pub fn new(root: Arc<Group>) -> Self {
        Self {
            root,
            state: NavigationState::default(),
        }
    }

    pub fn root(&self) -> &Arc<Group> {
        &self.root
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn display(&self) -> Option<&str> {
        self.state.display.as_deref()
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Swaps in a freshly loaded tree.
    ///
    /// The old path indexes the old tree, so navigation restarts at Idle.
    pub fn set_root(&mut self, root: Arc<Group>) {
        self.root = root;
        self.state.clear();
    }

    /// Groups along the path, outermost first (root excluded)
    pub fn path_groups(&self) -> Vec<&Group> {
        let mut groups = Vec::with_capacity(self.state.path.len());
        let mut current: &Group = &self.root;
        for &index in &self.state.path {
            match current.children.get(index).and_then(ActionOrGroup::as_group) {
                Some(group) => {
                    groups.push(group);
                    current = group;
                }
                None => break,
            }
        }
        groups
    }

    /// Group whose children the next key is matched against
    pub fn current_group(&self) -> &Group {
        self.path_groups().pop().unwrap_or(self.root.as_ref())
    }

    /// Display names along the path, for breadcrumbs
    pub fn breadcrumbs(&self) -> Vec<String> {
        self.path_groups()
            .into_iter()
            .map(|group| group.display_name().to_string())
            .collect()
    }

    /// Feeds one key to the state machine.
    ///
    /// The key may be given as a glyph or a text token. Matching is exact
    /// after canonicalisation, so `a` and `A` are different keys.
    ///
    /// With `execute` false a matched action is resolved but not handed to
    /// the executor. Either way, resolving an action returns to Idle.
    pub fn handle_key(
        &mut self,
        raw_key: &str,
        execute: bool,
        executor: &mut dyn ActionExecutor,
    ) -> KeyOutcome {
        let glyph = keymap::glyph(raw_key).to_string();

        let current = self.current_group();
        let found = current
            .children
            .iter()
            .position(|child| child.key().map(keymap::glyph) == Some(glyph.as_str()));

        let Some(index) = found else {
            trace!(key = %glyph, depth = self.state.path.len(), "no binding for key");
            return KeyOutcome::Miss { glyph };
        };

        let mut path = self.state.path.clone();
        path.push(index);

        match &current.children[index] {
            ActionOrGroup::Group(group) => {
                debug!(key = %glyph, group = group.display_name(), "entering group");
                self.state.path = path.clone();
                self.state.display = Some(glyph.clone());
                KeyOutcome::Descended { path, glyph }
            }
            ActionOrGroup::Action(action) => {
                let action = action.clone();
                if execute {
                    debug!(key = %glyph, kind = %action.kind, value = %action.value, "running action");
                    if let Err(e) = executor.execute(&action) {
                        warn!(error = %e, value = %action.value, "action failed");
                    }
                }
                self.state.clear();
                KeyOutcome::Triggered {
                    path,
                    action,
                    executed: execute,
                }
            }
        }
    }

    /// Clears the path and display, returning to Idle
    pub fn reset(&mut self) {
        if !self.state.is_idle() {
            debug!(depth = self.state.path.len(), "navigation reset");
        }
        self.state.clear();
    }
}
