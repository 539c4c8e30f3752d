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

//! Structural validation of the config tree
//!
//! Validation is advisory: a tree with problems still loads and runs. The
//! validator walks the whole tree depth-first (pre-order) and returns every
//! problem it finds, each tagged with the index path of the offending node.
//!
//! # Rules
//! Every action and every non-root group must have a key that is:
//! - present and non-empty (`EmptyKey`)
//! - a single character (one grapheme cluster) or a known key name
//!   (`NonSingleCharacterKey`)
//! - not reserved (reported as `DuplicateKey`)
//!
//! Within one group, keys must be unique after normalising them to glyphs,
//! so `"space"` and `"␣"` collide while `"a"` and `"A"` do not.

use std::collections::HashMap;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::keymap;
use crate::core::types::{Action, ActionOrGroup, Group};

/// Category of a validation problem
///
/// Reserved keys share the `DuplicateKey` bucket so consumers only deal with
/// "missing" vs "malformed" vs "clashing".
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValidationErrorKind {
    EmptyKey,
    NonSingleCharacterKey,
    DuplicateKey,
}

/// A single problem found in the tree
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationError {
    /// Zero-based child indices from the root to the offending node
    pub path: Vec<usize>,
    pub message: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    fn new(path: Vec<usize>, message: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path,
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "[{}] {}", path, self.message)
    }
}

/// Borrowed view of a node returned by `find_item`
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemRef<'a> {
    Action(&'a Action),
    Group(&'a Group),
}

impl<'a> From<&'a ActionOrGroup> for ItemRef<'a> {
    fn from(node: &'a ActionOrGroup) -> Self {
        match node {
            ActionOrGroup::Action(action) => ItemRef::Action(action),
            ActionOrGroup::Group(group) => ItemRef::Group(group),
        }
    }
}

/// Validates the whole tree rooted at `root`.
///
/// Never mutates the tree and never stops early. Identical trees always
/// produce identical, identically ordered error lists.
pub fn validate(root: &Group) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_group(root, &[], &mut errors);
    errors
}

fn validate_group(group: &Group, path: &[usize], errors: &mut Vec<ValidationError>) {
    // normalised key -> (first index, already reported)
    let mut seen: HashMap<&str, (usize, bool)> = HashMap::new();

    for (index, child) in group.children.iter().enumerate() {
        let child_path = [path, &[index]].concat();

        validate_key(child.key(), &child_path, errors);

        if let ActionOrGroup::Group(subgroup) = child {
            validate_group(subgroup, &child_path, errors);
        }

        let Some(key) = child.key().filter(|key| !key.is_empty()) else {
            continue;
        };
        let normalised = keymap::glyph(key);

        match seen.get_mut(normalised) {
            Some((first, reported)) => {
                let message = format!("Multiple actions for the same key '{}'", normalised);
                if !*reported {
                    errors.push(ValidationError::new(
                        [path, &[*first]].concat(),
                        message.clone(),
                        ValidationErrorKind::DuplicateKey,
                    ));
                    *reported = true;
                }
                errors.push(ValidationError::new(
                    child_path,
                    message,
                    ValidationErrorKind::DuplicateKey,
                ));
            }
            None => {
                seen.insert(normalised, (index, false));
            }
        }
    }
}

/// Checks a single node key. `path` is never empty here: the root has no key
/// to validate.
fn validate_key(key: Option<&str>, path: &[usize], errors: &mut Vec<ValidationError>) {
    let Some(key) = key else {
        errors.push(ValidationError::new(
            path.to_vec(),
            "Key is missing",
            ValidationErrorKind::EmptyKey,
        ));
        return;
    };

    if key.is_empty() {
        errors.push(ValidationError::new(
            path.to_vec(),
            "Key is empty",
            ValidationErrorKind::EmptyKey,
        ));
        return;
    }

    let entry = keymap::resolve(key);

    if entry.is_none() && key.graphemes(true).count() != 1 {
        errors.push(ValidationError::new(
            path.to_vec(),
            "Key must be a single character or a valid key name",
            ValidationErrorKind::NonSingleCharacterKey,
        ));
        return;
    }

    if entry.is_some_and(|entry| entry.reserved) && !path.is_empty() {
        errors.push(ValidationError::new(
            path.to_vec(),
            format!("Key '{}' is reserved and cannot be bound", key),
            ValidationErrorKind::DuplicateKey,
        ));
    }
}

/// Resolves an index path against the tree.
///
/// An empty path yields the root itself. Returns `None` when an index is out
/// of range or the path tries to descend through an action.
pub fn find_item<'a>(root: &'a Group, path: &[usize]) -> Option<ItemRef<'a>> {
    let Some((last, parents)) = path.split_last() else {
        return Some(ItemRef::Group(root));
    };

    let mut current = root;
    for &index in parents {
        current = current.children.get(index)?.as_group()?;
    }

    current.children.get(*last).map(ItemRef::from)
}
