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

use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{ReactivateBehavior, UserSettings};
use crate::core::{Action, ActionExecutor, ActionKind, Group, KeyOutcome};
use crate::session::{Session, SessionEvent, SessionOptions};

#[derive(Default)]
struct RecordingExecutor {
    executed: Vec<String>,
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, action: &Action) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.executed.push(action.value.clone());
        Ok(())
    }
}

/// Helper: `t` at the root, `o` group holding `s` and a nested `w` group
fn tree() -> Arc<Group> {
    Arc::new(Group {
        children: vec![
            Action::new("t", ActionKind::Application, "terminal").into(),
            Group::new(
                "o",
                vec![
                    Action::new("s", ActionKind::Application, "safari").into(),
                    Group::new("w", vec![Action::new("x", ActionKind::Url, "web").into()]).into(),
                ],
            )
            .into(),
        ],
        ..Group::default()
    })
}

fn session() -> Session<RecordingExecutor> {
    Session::new(tree(), UserSettings::default(), RecordingExecutor::default())
}

fn session_with(behavior: ReactivateBehavior) -> Session<RecordingExecutor> {
    let settings = UserSettings {
        reactivate_behavior: behavior,
        ..UserSettings::default()
    };
    Session::new(tree(), settings, RecordingExecutor::default())
}

fn press(key: &str) -> SessionEvent {
    SessionEvent::KeyPressed {
        key: key.to_string(),
        execute: true,
    }
}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[test]
fn test_keys_ignored_until_activated() {
    let mut session = session();
    let now = Instant::now();

    assert!(session.handle(press("t"), now).is_empty());
    assert!(session.executor().executed.is_empty());

    session.handle(SessionEvent::Activate, now);
    assert!(session.is_visible());
    let outcomes = session.handle(press("t"), now);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(session.executor().executed, vec!["terminal"]);
}

#[test]
fn test_triggered_leaf_hides_session() {
    let mut session = session();
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);

    session.handle(press("o"), now);
    assert_eq!(session.navigator().state().path, vec![1]);
    session.handle(press("s"), now);

    assert!(!session.is_visible());
    assert!(session.navigator().is_idle());
    assert_eq!(session.executor().executed, vec!["safari"]);
}

#[test]
fn test_miss_keeps_position_and_visibility() {
    let mut session = session();
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);

    let outcomes = session.handle(press("q"), now);

    assert!(outcomes[0].is_miss());
    assert!(session.is_visible());
    assert_eq!(session.navigator().state().path, vec![1]);
}

#[test]
fn test_reactivate_hide() {
    let mut session = session_with(ReactivateBehavior::Hide);
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);

    session.handle(SessionEvent::Activate, now);

    assert!(!session.is_visible());
    assert!(session.navigator().is_idle());
}

#[test]
fn test_reactivate_reset() {
    let mut session = session_with(ReactivateBehavior::Reset);
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);

    session.handle(SessionEvent::Activate, now);

    assert!(session.is_visible());
    assert!(session.navigator().is_idle());
}

#[test]
fn test_reactivate_nothing() {
    let mut session = session_with(ReactivateBehavior::Nothing);
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);

    session.handle(SessionEvent::Activate, now);

    assert!(session.is_visible());
    assert_eq!(session.navigator().state().path, vec![1]);
}

#[test]
fn test_dismiss_hides_and_clears() {
    let mut session = session();
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);

    session.handle(SessionEvent::Dismiss, now);

    assert!(!session.is_visible());
    assert!(session.navigator().is_idle());
}

#[test]
fn test_reload_swaps_tree_and_clears_path() {
    let mut session = session();
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);

    let replacement = Arc::new(Group {
        children: vec![Action::new("z", ActionKind::Command, "zed").into()],
        ..Group::default()
    });
    session.handle(SessionEvent::Reload(replacement), now);

    assert!(session.navigator().is_idle());
    assert!(session.handle(press("t"), now)[0].is_miss());
    session.handle(press("z"), now);
    assert_eq!(session.executor().executed, vec!["zed"]);
}

#[test]
fn test_group_shortcut_replays_with_increasing_delays() {
    let mut session = session();
    let start = Instant::now();

    let outcomes = session.handle(SessionEvent::GroupShortcut(keys(&["o", "w"])), start);

    assert!(session.is_visible(), "Group shortcut activates a hidden session");
    assert!(matches!(outcomes[0], KeyOutcome::Descended { .. }));
    assert_eq!(session.navigator().state().path, vec![1]);
    assert_eq!(session.pending_keys(), 1);
    assert_eq!(session.next_deadline(), Some(start + Duration::from_millis(100)));

    assert!(session.fire_due(start + Duration::from_millis(99)).is_empty());
    let fired = session.fire_due(start + Duration::from_millis(100));

    assert_eq!(fired.len(), 1);
    assert_eq!(session.navigator().state().path, vec![1, 1]);
    assert_eq!(session.pending_keys(), 0);
}

#[test]
fn test_macro_keys_fire_in_order_even_when_late() {
    let mut session = session();
    let start = Instant::now();

    session.handle(SessionEvent::GroupShortcut(keys(&["o", "w", "x"])), start);
    let fired = session.fire_due(start + Duration::from_secs(5));

    assert_eq!(fired.len(), 2);
    assert!(matches!(&fired[0], KeyOutcome::Descended { glyph, .. } if glyph == "w"));
    assert!(matches!(&fired[1], KeyOutcome::Triggered { executed: true, .. }));
    assert_eq!(session.executor().executed, vec!["web"]);
    assert!(!session.is_visible());
}

#[test]
fn test_group_shortcut_starts_from_root() {
    let mut session = session();
    let now = Instant::now();
    session.handle(SessionEvent::Activate, now);
    session.handle(press("o"), now);
    session.handle(press("w"), now);

    session.handle(SessionEvent::GroupShortcut(keys(&["o"])), now);

    assert!(session.is_visible());
    assert_eq!(session.navigator().state().path, vec![1]);
}

#[test]
fn test_reset_keeps_pending_keys_by_default() {
    let mut session = session();
    let start = Instant::now();
    session.handle(SessionEvent::GroupShortcut(keys(&["o", "w"])), start);

    session.handle(SessionEvent::Reset, start + Duration::from_millis(50));
    assert_eq!(session.pending_keys(), 1);

    // The stale key now lands on the root, where `w` is unbound
    let fired = session.fire_due(start + Duration::from_millis(100));
    assert!(fired[0].is_miss());
}

#[test]
fn test_reset_cancels_pending_keys_when_configured() {
    let options = SessionOptions {
        cancel_macros_on_reset: true,
        ..SessionOptions::default()
    };
    let mut session = Session::with_options(
        tree(),
        UserSettings::default(),
        RecordingExecutor::default(),
        options,
    );
    let start = Instant::now();
    session.handle(SessionEvent::GroupShortcut(keys(&["o", "w", "x"])), start);

    session.handle(SessionEvent::Reset, start);

    assert_eq!(session.pending_keys(), 0);
    assert!(session.fire_due(start + Duration::from_secs(1)).is_empty());
    assert!(session.executor().executed.is_empty());
}

#[test]
fn test_cancel_single_macro() {
    let mut session = session();
    let start = Instant::now();
    let (first, _) = session.start_macro(keys(&["o", "w", "x"]), start);
    let (second, _) = session.start_macro(keys(&["o", "w"]), start);
    assert_ne!(first, second);
    assert_eq!(session.pending_keys(), 3);

    assert_eq!(session.cancel_macro(first), 2);
    assert_eq!(session.cancel_macro(first), 0);
    assert_eq!(session.pending_keys(), 1);

    session.fire_due(start + Duration::from_secs(1));
    assert_eq!(session.navigator().state().path, vec![1, 1]);
    assert!(session.executor().executed.is_empty());
}

#[test]
fn test_empty_macro_only_activates() {
    let mut session = session();
    let (_, outcomes) = session.start_macro(Vec::new(), Instant::now());

    assert!(outcomes.is_empty());
    assert!(session.is_visible());
    assert_eq!(session.pending_keys(), 0);
}

#[test]
fn test_run_processes_events_until_shutdown() {
    let (tx, rx) = channel();
    let handle = thread::spawn(move || {
        let mut session = session();
        let mut seen = Vec::new();
        session.run(&rx, |outcome| seen.push(outcome.clone()));
        (session.executor().executed.clone(), seen, session.is_running())
    });

    tx.send(SessionEvent::GroupShortcut(keys(&["o", "w", "x"]))).unwrap();
    thread::sleep(Duration::from_millis(400));
    tx.send(SessionEvent::Shutdown).unwrap();

    let (executed, seen, running) = handle.join().unwrap();
    assert_eq!(executed, vec!["web"]);
    assert_eq!(seen.len(), 3);
    assert!(!running);
}

#[test]
fn test_run_stops_when_senders_drop() {
    let (tx, rx) = channel::<SessionEvent>();
    drop(tx);

    let mut session = session();
    session.run(&rx, |_| {});

    assert!(session.is_running(), "Only Shutdown clears the running flag");
}
