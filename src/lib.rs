// Copyright 2025 bakri (tidynest@proton.me)
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

//! Leader Keys
//!
//! A leader-key launcher core: define a tree of actions and groups, then
//! reach any of them by pressing one key at a time.
//!
//! # Features
//!
//! - **Key Registry:** One table reconciling scan codes, display glyphs and
//!   config tokens
//! - **Validation:** Missing, reserved and duplicate keys reported with
//!   their tree paths, without blocking load
//! - **Shortcut Parsing:** `control+space` style strings for the activation
//!   hotkey and per-group hotkeys
//! - **Navigation:** Keypress-by-keypress state machine with macro replay
//! - **Atomic Operations:** Config files written temp-then-rename, trees
//!   swapped whole on reload
//!
//! # Architecture
//!
//! - **`core`:** Pure logic (key registry, tree types, validator, shortcut
//!   parser, navigator)
//! - **`config`:** config.json / settings.json loading, saving and watching
//! - **`session`:** Single-threaded dispatch actor with timed macro replay
//! - **`hotkeys`:** Which global shortcuts to register, behind a registrar trait
//! - **`executor`:** Dry-run and live action execution
//! - **`logging`:** tracing subscriber setup
//!
//! # Examples
//!
//! ## Validating a config tree
//!
//! ```
//! use leader_keys::core::{validate, Action, ActionKind, Group};
//!
//! let root = Group {
//!     children: vec![
//!         Action::new("a", ActionKind::Command, "true").into(),
//!         Action::new("a", ActionKind::Command, "false").into(),
//!     ],
//!     ..Group::default()
//! };
//!
//! let errors = validate(&root);
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].path, vec![0]);
//! assert_eq!(errors[1].path, vec![1]);
//! ```
//!
//! ## Driving a session
//!
//! ```
//! use leader_keys::config::UserSettings;
//! use leader_keys::core::{Action, ActionKind, Group};
//! use leader_keys::executor::{ActionRunner, ExecMode};
//! use leader_keys::session::{Session, SessionEvent};
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! let root = Arc::new(Group {
//!     children: vec![Action::new("t", ActionKind::Application, "Terminal").into()],
//!     ..Group::default()
//! });
//! let mut session = Session::new(root, UserSettings::default(), ActionRunner::new(ExecMode::DryRun));
//!
//! session.handle(SessionEvent::Activate, Instant::now());
//! session.handle(SessionEvent::KeyPressed { key: "t".into(), execute: true }, Instant::now());
//!
//! assert_eq!(session.executor().history().len(), 1);
//! assert!(!session.is_visible());
//! ```

pub mod config;
pub mod core;
pub mod executor;
pub mod hotkeys;
pub mod logging;
pub mod session;

// Re-export commonly used types for convenience
pub use core::{Action, ActionKind, ActionOrGroup, Group, Navigator, Shortcut};
