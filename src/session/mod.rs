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

//! Single-threaded dispatch actor
//!
//! Every key event, reset, dismissal and config reload goes through one
//! `Session`, one event at a time. The navigator underneath has no locking
//! because nothing else ever touches it.
//!
//! # Macro replay
//!
//! A group's global shortcut replays the key path to that group as if the
//! user typed it: the first key is delivered at once, each later key
//! `replay_interval` after the previous one. Pending keys sit in a timer
//! queue ordered by deadline and then by insertion, so keys from one macro
//! can never overtake each other.
//!
//! Time is passed in explicitly (`handle(event, now)`, `fire_due(now)`)
//! so the queue can be driven deterministically; `run()` supplies the
//! wall clock.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::config::{ReactivateBehavior, UserSettings};
use crate::core::{ActionExecutor, Group, KeyOutcome, Navigator};

/// Delay between replayed macro keys
pub const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_millis(100);

/// Input to the session actor
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The activation shortcut fired
    Activate,
    /// A group's global shortcut fired; replay these keys from the root
    GroupShortcut(Vec<String>),
    /// A key was pressed while the overlay has focus
    KeyPressed { key: String, execute: bool },
    /// Go back to the root, keep the overlay open
    Reset,
    /// Hide the overlay and forget the path
    Dismiss,
    /// A freshly loaded tree
    Reload(Arc<Group>),
    /// Stop `run()`
    Shutdown,
}

/// Identifies the pending keys of one replayed macro
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MacroId(u64);

impl fmt::Display for MacroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "macro#{}", self.0)
    }
}

/// Tunables that are not user settings
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub replay_interval: Duration,
    /// Drop pending macro keys on `Reset` and `Dismiss`
    pub cancel_macros_on_reset: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            replay_interval: DEFAULT_REPLAY_INTERVAL,
            cancel_macros_on_reset: false,
        }
    }
}

/// One deferred key delivery
#[derive(Debug)]
struct PendingKey {
    due: Instant,
    seq: u64,
    macro_id: MacroId,
    key: String,
}

impl PartialEq for PendingKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingKey {}

impl PartialOrd for PendingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// The dispatch actor
pub struct Session<E: ActionExecutor> {
    navigator: Navigator,
    executor: E,
    settings: UserSettings,
    options: SessionOptions,
    visible: bool,
    timers: BinaryHeap<Reverse<PendingKey>>,
    next_seq: u64,
    next_macro: u64,
    running: bool,
}

impl<E: ActionExecutor> Session<E> {
    pub fn new(root: Arc<Group>, settings: UserSettings, executor: E) -> Self {
        Self::with_options(root, settings, executor, SessionOptions::default())
    }

    pub fn with_options(
        root: Arc<Group>,
        settings: UserSettings,
        executor: E,
        options: SessionOptions,
    ) -> Self {
        Self {
            navigator: Navigator::new(root),
            executor,
            settings,
            options,
            visible: false,
            timers: BinaryHeap::new(),
            next_seq: 0,
            next_macro: 0,
            running: true,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Replaces the injected settings (after settings.json changed)
    pub fn set_settings(&mut self, settings: UserSettings) {
        self.settings = settings;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of macro keys still waiting to be delivered
    pub fn pending_keys(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the earliest pending macro key
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.peek().map(|Reverse(pending)| pending.due)
    }

    /// Processes one event at time `now`.
    ///
    /// Returns the outcome of every key resolved while handling it (only
    /// the first key of a macro resolves immediately).
    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> Vec<KeyOutcome> {
        trace!(?event, "session event");
        match event {
            SessionEvent::Activate => {
                self.activate();
                Vec::new()
            }
            SessionEvent::GroupShortcut(keys) => self.start_macro(keys, now).1,
            SessionEvent::KeyPressed { key, execute } => {
                self.press(&key, execute).into_iter().collect()
            }
            SessionEvent::Reset => {
                self.navigator.reset();
                if self.options.cancel_macros_on_reset {
                    self.cancel_all_macros();
                }
                Vec::new()
            }
            SessionEvent::Dismiss => {
                self.hide();
                if self.options.cancel_macros_on_reset {
                    self.cancel_all_macros();
                }
                Vec::new()
            }
            SessionEvent::Reload(root) => {
                info!(actions = root.action_count(), "session tree reloaded");
                self.navigator.set_root(root);
                Vec::new()
            }
            SessionEvent::Shutdown => {
                debug!(pending = self.timers.len(), "session shutting down");
                self.running = false;
                Vec::new()
            }
        }
    }

    /// Starts replaying `keys` from the root.
    ///
    /// Shows the session if hidden and clears the path first. The first key
    /// is delivered immediately; its outcome is returned with the macro id.
    pub fn start_macro(&mut self, keys: Vec<String>, now: Instant) -> (MacroId, Vec<KeyOutcome>) {
        let id = MacroId(self.next_macro);
        self.next_macro += 1;

        if !self.visible {
            self.show();
        }
        self.navigator.reset();

        let mut keys = keys.into_iter();
        let Some(first) = keys.next() else {
            return (id, Vec::new());
        };

        let mut due = now;
        for key in keys {
            due += self.options.replay_interval;
            let seq = self.next_seq;
            self.next_seq += 1;
            self.timers.push(Reverse(PendingKey {
                due,
                seq,
                macro_id: id,
                key,
            }));
        }
        debug!(%id, pending = self.timers.len(), "macro started");

        (id, self.press(&first, true).into_iter().collect())
    }

    /// Drops every pending key of one macro. Returns how many were dropped.
    pub fn cancel_macro(&mut self, id: MacroId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|Reverse(pending)| pending.macro_id != id);
        let dropped = before - self.timers.len();
        if dropped > 0 {
            debug!(%id, dropped, "macro cancelled");
        }
        dropped
    }

    fn cancel_all_macros(&mut self) {
        if !self.timers.is_empty() {
            debug!(dropped = self.timers.len(), "pending macro keys cancelled");
            self.timers.clear();
        }
    }

    /// Delivers every macro key whose deadline is at or before `now`, in order.
    pub fn fire_due(&mut self, now: Instant) -> Vec<KeyOutcome> {
        let mut outcomes = Vec::new();
        while let Some(Reverse(pending)) = self.timers.peek() {
            if pending.due > now {
                break;
            }
            let Some(Reverse(pending)) = self.timers.pop() else {
                break;
            };
            trace!(id = %pending.macro_id, key = %pending.key, "replaying macro key");
            outcomes.extend(self.press(&pending.key, true));
        }
        outcomes
    }

    /// Runs the actor until `Shutdown` or until every sender is gone.
    ///
    /// Blocks on the channel, waking early when a macro key is due.
    /// `on_outcome` sees every resolved key in delivery order.
    pub fn run(&mut self, rx: &Receiver<SessionEvent>, mut on_outcome: impl FnMut(&KeyOutcome)) {
        while self.running {
            let received = match self.next_deadline() {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    rx.recv_timeout(wait)
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            let outcomes = match received {
                Ok(event) => self.handle(event, Instant::now()),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("event channel closed");
                    break;
                }
            };
            for outcome in outcomes.iter().chain(&self.fire_due(Instant::now())) {
                on_outcome(outcome);
            }
        }
    }

    fn activate(&mut self) {
        if !self.visible {
            self.show();
            return;
        }
        match self.settings.reactivate_behavior {
            ReactivateBehavior::Hide => self.hide(),
            ReactivateBehavior::Reset => self.navigator.reset(),
            ReactivateBehavior::Nothing => trace!("reactivation ignored"),
        }
    }

    fn show(&mut self) {
        debug!("session shown");
        self.visible = true;
    }

    fn hide(&mut self) {
        if self.visible {
            debug!("session hidden");
        }
        self.visible = false;
        self.navigator.reset();
    }

    /// Feeds a key to the navigator if the overlay is up
    fn press(&mut self, key: &str, execute: bool) -> Option<KeyOutcome> {
        if !self.visible {
            trace!(key, "key ignored while hidden");
            return None;
        }
        let outcome = self.navigator.handle_key(key, execute, &mut self.executor);
        if matches!(outcome, KeyOutcome::Triggered { .. }) {
            self.hide();
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests;
