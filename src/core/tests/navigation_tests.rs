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

//! Navigation state machine tests

use std::sync::Arc;

use crate::core::{
    navigation::{ActionExecutor, KeyOutcome, Navigator},
    types::{Action, ActionKind, ActionOrGroup, Group},
};

/// Records every action it is asked to run
#[derive(Default)]
struct RecordingExecutor {
    executed: Vec<Action>,
    fail: bool,
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, action: &Action) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.executed.push(action.clone());
        if self.fail {
            return Err("launch failed".into());
        }
        Ok(())
    }
}

/// Helper: root with a terminal action, an "o" group and a nested "w" group
fn sample_tree() -> Arc<Group> {
    let open: ActionOrGroup = Group::new(
        "o",
        vec![
            Action::new("s", ActionKind::Application, "/Applications/Safari.app").into(),
            Action::new("S", ActionKind::Application, "/Applications/Slack.app").into(),
            Group::new(
                "w",
                vec![Action::new("space", ActionKind::Url, "https://example.com").into()],
            )
            .with_label("Web")
            .into(),
        ],
    )
    .with_label("Open")
    .into();

    Arc::new(Group {
        children: vec![
            Action::new("t", ActionKind::Application, "/Applications/Terminal.app").into(),
            open,
        ],
        ..Group::empty_root()
    })
}

#[test]
fn test_starts_idle_at_root() {
    let navigator = Navigator::new(sample_tree());

    assert!(navigator.is_idle());
    assert!(navigator.display().is_none());
    assert_eq!(navigator.current_group().children.len(), 2);
}

#[test]
fn test_group_then_action() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    let outcome = navigator.handle_key("o", true, &mut executor);
    assert_eq!(
        outcome,
        KeyOutcome::Descended {
            path: vec![1],
            glyph: "o".to_string()
        }
    );
    assert!(executor.executed.is_empty());
    assert_eq!(navigator.state().path, vec![1]);
    assert_eq!(navigator.display(), Some("o"));

    let outcome = navigator.handle_key("s", true, &mut executor);
    match outcome {
        KeyOutcome::Triggered { path, action, executed } => {
            assert_eq!(path, vec![1, 0]);
            assert_eq!(action.value, "/Applications/Safari.app");
            assert!(executed);
        }
        other => panic!("Expected Triggered, got {:?}", other),
    }
    assert_eq!(executor.executed.len(), 1);
    assert!(navigator.is_idle());
    assert!(navigator.display().is_none());
}

#[test]
fn test_case_sensitive_match() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    navigator.handle_key("o", true, &mut executor);
    navigator.handle_key("S", true, &mut executor);

    assert_eq!(executor.executed[0].value, "/Applications/Slack.app");
}

#[test]
fn test_miss_leaves_state_untouched() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    navigator.handle_key("o", true, &mut executor);
    let before = navigator.state().clone();

    for _ in 0..3 {
        let outcome = navigator.handle_key("z", true, &mut executor);
        assert_eq!(outcome, KeyOutcome::Miss { glyph: "z".to_string() });
        assert!(outcome.is_miss());
    }

    assert_eq!(navigator.state(), &before);
    assert!(executor.executed.is_empty());
}

#[test]
fn test_miss_at_idle() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    assert!(navigator.handle_key("q", true, &mut executor).is_miss());
    assert!(navigator.is_idle());
    assert!(navigator.display().is_none());
}

#[test]
fn test_text_and_glyph_input_are_equivalent() {
    let mut executor = RecordingExecutor::default();

    let mut by_text = Navigator::new(sample_tree());
    by_text.handle_key("o", true, &mut executor);
    by_text.handle_key("w", true, &mut executor);
    let text_outcome = by_text.handle_key("space", true, &mut executor);

    let mut by_glyph = Navigator::new(sample_tree());
    by_glyph.handle_key("o", true, &mut executor);
    by_glyph.handle_key("w", true, &mut executor);
    let glyph_outcome = by_glyph.handle_key("␣", true, &mut executor);

    assert_eq!(text_outcome, glyph_outcome);
    assert_eq!(executor.executed.len(), 2);
}

#[test]
fn test_nested_descent_and_breadcrumbs() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    navigator.handle_key("o", true, &mut executor);
    navigator.handle_key("w", true, &mut executor);

    assert_eq!(navigator.state().path, vec![1, 2]);
    assert_eq!(navigator.breadcrumbs(), vec!["Open".to_string(), "Web".to_string()]);
    assert_eq!(navigator.current_group().label.as_deref(), Some("Web"));
}

#[test]
fn test_execute_false_resolves_without_running() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    let outcome = navigator.handle_key("t", false, &mut executor);

    assert!(matches!(outcome, KeyOutcome::Triggered { executed: false, .. }));
    assert!(executor.executed.is_empty());
    assert!(navigator.is_idle());
}

#[test]
fn test_executor_failure_still_returns_to_idle() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor {
        fail: true,
        ..Default::default()
    };

    navigator.handle_key("o", true, &mut executor);
    let outcome = navigator.handle_key("s", true, &mut executor);

    assert!(matches!(outcome, KeyOutcome::Triggered { executed: true, .. }));
    assert!(navigator.is_idle());
}

#[test]
fn test_reset_clears_path_and_display() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    navigator.handle_key("o", true, &mut executor);
    navigator.handle_key("w", true, &mut executor);
    navigator.reset();

    assert!(navigator.is_idle());
    assert!(navigator.display().is_none());
    // Root-level keys work again
    assert!(matches!(
        navigator.handle_key("t", true, &mut executor),
        KeyOutcome::Triggered { .. }
    ));
}

#[test]
fn test_same_sequence_reaches_same_outcome() {
    let mut executor = RecordingExecutor::default();
    let keys = ["o", "x", "w", "space"];

    let run = |executor: &mut RecordingExecutor| {
        let mut navigator = Navigator::new(sample_tree());
        keys.iter()
            .map(|key| navigator.handle_key(key, true, &mut *executor))
            .collect::<Vec<_>>()
    };

    let first = run(&mut executor);
    let second = run(&mut executor);
    assert_eq!(first, second);
    assert!(first[1].is_miss());
}

#[test]
fn test_set_root_restarts_navigation() {
    let mut navigator = Navigator::new(sample_tree());
    let mut executor = RecordingExecutor::default();

    navigator.handle_key("o", true, &mut executor);
    navigator.set_root(Arc::new(Group::empty_root()));

    assert!(navigator.is_idle());
    assert!(navigator.handle_key("t", true, &mut executor).is_miss());
}

#[test]
fn test_first_matching_child_wins() {
    let tree = Arc::new(Group {
        children: vec![
            Action::new("a", ActionKind::Command, "first").into(),
            Action::new("a", ActionKind::Command, "second").into(),
        ],
        ..Group::empty_root()
    });
    let mut navigator = Navigator::new(tree);
    let mut executor = RecordingExecutor::default();

    navigator.handle_key("a", true, &mut executor);
    assert_eq!(executor.executed[0].value, "first");
}
