//! Global hotkey binding
//!
//! The platform hotkey API is a seam ([`HotkeyRegistrar`]); this module
//! decides *what* gets registered:
//!
//! - one activation shortcut from settings, falling back to `control+space`
//! - one shortcut per group with a parseable `global_shortcut`, whose
//!   target is the key path from the root to that group
//!
//! [`HotkeyTable`] is an in-process registrar with O(1) lookup by
//! [`Shortcut`], used by the command line `run` loop.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::settings::DEFAULT_ACTIVATION_SHORTCUT;
use crate::config::UserSettings;
use crate::core::{keymap, ActionOrGroup, Group, Modifier, Shortcut, ShortcutKey};
use crate::session::SessionEvent;

/// Hotkey registration errors
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HotkeyError {
    #[error("Shortcut '{0}' is already registered")]
    AlreadyRegistered(Shortcut),
}

/// What a registered shortcut does when pressed
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HotkeyTarget {
    /// Open the leader-key session
    Activate,
    /// Jump into a group by replaying its key path (text tokens)
    Group { keys: Vec<String> },
}

impl HotkeyTarget {
    /// Session event this target produces
    pub fn to_event(&self) -> SessionEvent {
        match self {
            HotkeyTarget::Activate => SessionEvent::Activate,
            HotkeyTarget::Group { keys } => SessionEvent::GroupShortcut(keys.clone()),
        }
    }
}

/// Platform hotkey capability
pub trait HotkeyRegistrar {
    fn register(&mut self, shortcut: Shortcut, target: HotkeyTarget) -> Result<(), HotkeyError>;
    fn unregister_all(&mut self);
}

/// A group shortcut that was not registered
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedShortcut {
    /// Group display name
    pub group: String,
    /// The shortcut string as written in the config
    pub shortcut: String,
    pub reason: String,
}

/// Summary of one `bind_hotkeys` pass
#[derive(Clone, Debug, PartialEq)]
pub struct BindingReport {
    pub activation: Shortcut,
    /// True when the configured activation shortcut was unusable
    pub activation_fallback: bool,
    /// Registered group shortcuts with their key paths, in pre-order
    pub groups: Vec<(Shortcut, Vec<String>)>,
    pub skipped: Vec<SkippedShortcut>,
}

/// Shortcut used when settings hold an unparseable activation string
pub fn default_activation() -> Shortcut {
    Shortcut::parse(DEFAULT_ACTIVATION_SHORTCUT)
        .unwrap_or_else(|| Shortcut::new(vec![Modifier::Control], ShortcutKey::Space))
}

/// A group's shortcut string and its key path from the root
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupShortcut<'a> {
    pub group: &'a Group,
    pub shortcut: &'a str,
    /// Text tokens from the root down to the group, `None` if any
    /// group on the way has no key
    pub keys: Option<Vec<String>>,
}

/// Collects every group with a `global_shortcut`, in pre-order
pub fn group_shortcuts(root: &Group) -> Vec<GroupShortcut<'_>> {
    fn walk<'a>(group: &'a Group, prefix: Option<Vec<String>>, out: &mut Vec<GroupShortcut<'a>>) {
        for child in &group.children {
            let ActionOrGroup::Group(child) = child else {
                continue;
            };
            let keys = match (&prefix, child.key.as_deref()) {
                (Some(prefix), Some(key)) if !key.is_empty() => {
                    let mut keys = prefix.clone();
                    keys.push(keymap::text(key).to_string());
                    Some(keys)
                }
                _ => None,
            };
            if let Some(shortcut) = child.global_shortcut.as_deref() {
                out.push(GroupShortcut {
                    group: child,
                    shortcut,
                    keys: keys.clone(),
                });
            }
            walk(child, keys, out);
        }
    }

    let mut out = Vec::new();
    walk(root, Some(Vec::new()), &mut out);
    out
}

/// Re-registers all global hotkeys from settings and the config tree.
///
/// Only a failure to register the activation shortcut is an error; bad
/// group shortcuts are skipped and listed in the report.
pub fn bind_hotkeys(
    registrar: &mut dyn HotkeyRegistrar,
    settings: &UserSettings,
    root: &Group,
) -> Result<BindingReport, HotkeyError> {
    registrar.unregister_all();

    let (activation, activation_fallback) = match Shortcut::parse(&settings.activation_shortcut) {
        Some(shortcut) => (shortcut, false),
        None => {
            warn!(
                shortcut = %settings.activation_shortcut,
                fallback = DEFAULT_ACTIVATION_SHORTCUT,
                "activation shortcut could not be parsed"
            );
            (default_activation(), true)
        }
    };
    registrar.register(activation.clone(), HotkeyTarget::Activate)?;
    debug!(shortcut = %activation, "activation shortcut registered");

    let mut groups = Vec::new();
    let mut skipped = Vec::new();

    for entry in group_shortcuts(root) {
        let group = entry.group.display_name().to_string();
        let mut skip = |reason: String| {
            warn!(group = %group, shortcut = entry.shortcut, %reason, "group shortcut skipped");
            skipped.push(SkippedShortcut {
                group: group.clone(),
                shortcut: entry.shortcut.to_string(),
                reason,
            });
        };

        let Some(shortcut) = Shortcut::parse(entry.shortcut) else {
            skip("unparseable shortcut".to_string());
            continue;
        };
        let Some(keys) = entry.keys else {
            skip("group path has a missing key".to_string());
            continue;
        };

        let target = HotkeyTarget::Group { keys: keys.clone() };
        match registrar.register(shortcut.clone(), target) {
            Ok(()) => {
                debug!(shortcut = %shortcut, group = %group, "group shortcut registered");
                groups.push((shortcut, keys));
            }
            Err(e) => skip(e.to_string()),
        }
    }

    Ok(BindingReport {
        activation,
        activation_fallback,
        groups,
        skipped,
    })
}

/// In-process registrar keyed by shortcut
#[derive(Debug, Default)]
pub struct HotkeyTable {
    bindings: HashMap<Shortcut, HotkeyTarget>,
}

impl HotkeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, shortcut: &Shortcut) -> Option<&HotkeyTarget> {
        self.bindings.get(shortcut)
    }

    /// Event for a shortcut string, if it parses and is registered
    pub fn event_for(&self, input: &str) -> Option<SessionEvent> {
        let shortcut = Shortcut::parse(input)?;
        self.lookup(&shortcut).map(HotkeyTarget::to_event)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl HotkeyRegistrar for HotkeyTable {
    fn register(&mut self, shortcut: Shortcut, target: HotkeyTarget) -> Result<(), HotkeyError> {
        if self.bindings.contains_key(&shortcut) {
            return Err(HotkeyError::AlreadyRegistered(shortcut));
        }
        self.bindings.insert(shortcut, target);
        Ok(())
    }

    fn unregister_all(&mut self) {
        self.bindings.clear();
    }
}
