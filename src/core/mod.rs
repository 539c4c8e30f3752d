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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the data structures and algorithms that make
//! leader-key navigation correct and predictable:
//! - Three-way key identity registry (scan code / glyph / text token)
//! - Config tree types (actions and groups)
//! - Structural validation of the config tree
//! - Global shortcut string parsing
//! - The key-sequence navigation state machine
//!
//! Nothing here touches files, windows or processes, so every rule can be
//! unit tested without a display server.

pub mod keymap;
pub mod navigation;
pub mod shortcut;
pub mod types;
pub mod validator;

pub use keymap::KeyMapEntry;
pub use navigation::{ActionExecutor, KeyOutcome, NavigationState, Navigator};
pub use shortcut::{parse_shortcut, Modifier, Shortcut, ShortcutKey, ShortcutParseError};
pub use types::*;
pub use validator::{find_item, validate, ItemRef, ValidationError, ValidationErrorKind};

#[cfg(test)]
mod tests;
