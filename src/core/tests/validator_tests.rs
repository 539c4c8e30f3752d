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

use crate::core::{
    types::{Action, ActionKind, ActionOrGroup, Group},
    validator::{find_item, validate, ItemRef, ValidationErrorKind},
};

/// Helper to create a keyed action
fn action(key: &str) -> ActionOrGroup {
    Action::new(key, ActionKind::Command, "true").into()
}

/// Helper to create a keyed group
fn group(key: &str, children: Vec<ActionOrGroup>) -> ActionOrGroup {
    Group::new(key, children).into()
}

fn root(children: Vec<ActionOrGroup>) -> Group {
    Group {
        children,
        ..Group::empty_root()
    }
}

#[test]
fn test_valid_tree_has_no_errors() {
    let tree = root(vec![
        action("a"),
        action("A"),
        action("space"),
        group("o", vec![action("a"), action("1")]),
    ]);

    assert!(validate(&tree).is_empty());
}

#[test]
fn test_empty_root_is_valid() {
    assert!(validate(&Group::empty_root()).is_empty());
}

#[test]
fn test_missing_key() {
    let mut missing = Action::new("x", ActionKind::Url, "https://example.com");
    missing.key = None;
    let tree = root(vec![missing.into()]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::EmptyKey);
    assert_eq!(errors[0].path, vec![0]);
    assert_eq!(errors[0].message, "Key is missing");
}

#[test]
fn test_empty_key() {
    let tree = root(vec![action("a"), action("")]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::EmptyKey);
    assert_eq!(errors[0].path, vec![1]);
    assert_eq!(errors[0].message, "Key is empty");
}

#[test]
fn test_multi_character_key() {
    let tree = root(vec![action("ab"), action("hyper")]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| e.kind == ValidationErrorKind::NonSingleCharacterKey));
}

#[test]
fn test_named_keys_and_unknown_single_characters_are_accepted() {
    let tree = root(vec![action("enter"), action("↑"), action(";"), action("é")]);
    assert!(validate(&tree).is_empty());
}

#[test]
fn test_multi_codepoint_single_characters_are_accepted() {
    // Combining accent and skin-tone modifier: one visible character each
    let tree = root(vec![action("e\u{301}"), action("👍🏽")]);
    assert!(validate(&tree).is_empty());
}

#[test]
fn test_two_visible_characters_are_rejected() {
    let tree = root(vec![action("e\u{301}x")]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::NonSingleCharacterKey);
}

#[test]
fn test_duplicate_siblings_report_both_occurrences() {
    let tree = root(vec![action("a"), action("b"), action("a")]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].path, vec![0]);
    assert_eq!(errors[1].path, vec![2]);
    assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::DuplicateKey));
    assert_eq!(errors[0].message, errors[1].message);
    assert!(errors[0].message.contains("'a'"));
}

#[test]
fn test_triple_duplicate_reports_first_index_once() {
    let tree = root(vec![action("a"), action("a"), action("a")]);

    let errors = validate(&tree);
    let paths: Vec<Vec<usize>> = errors.iter().map(|e| e.path.clone()).collect();
    assert_eq!(paths, vec![vec![0], vec![1], vec![2]]);
}

#[test]
fn test_duplicates_compare_normalised_keys() {
    // "space" and "␣" are the same key
    let tree = root(vec![action("space"), action("␣")]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains("'␣'"));
}

#[test]
fn test_case_variants_are_not_duplicates() {
    let tree = root(vec![action("a"), action("A")]);
    assert!(validate(&tree).is_empty());
}

#[test]
fn test_same_key_in_different_groups_is_fine() {
    let tree = root(vec![action("a"), group("g", vec![action("a")])]);
    assert!(validate(&tree).is_empty());
}

#[test]
fn test_reserved_keys_are_reported_as_duplicate_kind() {
    let tree = root(vec![action("escape"), group("g", vec![action("backspace")])]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].path, vec![0]);
    assert_eq!(errors[1].path, vec![1, 0]);
    assert!(errors.iter().all(|e| e.kind == ValidationErrorKind::DuplicateKey));
    assert!(errors[0].message.contains("reserved"));
}

#[test]
fn test_reserved_glyph_on_group() {
    let tree = root(vec![group("⎋", vec![action("a")])]);

    let errors = validate(&tree);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateKey);
}

#[test]
fn test_errors_follow_preorder() {
    let tree = root(vec![
        group("", vec![action(""), action("xx")]),
        action("a"),
        action("a"),
    ]);

    let errors = validate(&tree);
    let summary: Vec<(Vec<usize>, ValidationErrorKind)> =
        errors.iter().map(|e| (e.path.clone(), e.kind)).collect();

    assert_eq!(
        summary,
        vec![
            (vec![0], ValidationErrorKind::EmptyKey),
            (vec![0, 0], ValidationErrorKind::EmptyKey),
            (vec![0, 1], ValidationErrorKind::NonSingleCharacterKey),
            (vec![1], ValidationErrorKind::DuplicateKey),
            (vec![2], ValidationErrorKind::DuplicateKey),
        ]
    );
}

#[test]
fn test_validation_is_deterministic() {
    let tree = root(vec![
        action("a"),
        action("a"),
        group("g", vec![action("escape"), action("zz"), action("")]),
        action("g"),
    ]);

    let first = validate(&tree);
    let second = validate(&tree);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_find_item_resolves_paths() {
    let tree = root(vec![action("a"), group("g", vec![action("x"), action("y")])]);

    match find_item(&tree, &[1, 0]) {
        Some(ItemRef::Action(found)) => assert_eq!(found.key.as_deref(), Some("x")),
        other => panic!("Expected action, got {:?}", other),
    }
    assert!(matches!(find_item(&tree, &[1]), Some(ItemRef::Group(_))));
    assert!(matches!(find_item(&tree, &[]), Some(ItemRef::Group(g)) if g.key.is_none()));
}

#[test]
fn test_find_item_rejects_bad_paths() {
    let tree = root(vec![action("a"), group("g", vec![action("x")])]);

    // Descends through a leaf
    assert!(find_item(&tree, &[0, 0]).is_none());
    // Out of range at the top and inside a group
    assert!(find_item(&tree, &[2]).is_none());
    assert!(find_item(&tree, &[5, 0]).is_none());
    assert!(find_item(&tree, &[1, 1]).is_none());
}

#[test]
fn test_error_display_includes_path() {
    let tree = root(vec![group("g", vec![action("")])]);
    let errors = validate(&tree);

    assert_eq!(format!("{}", errors[0]), "[0.0] Key is empty");
}
