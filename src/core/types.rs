//! src/core/types.rs
//!
//! Configuration tree definitions
//!
//! This module defines the data model the launcher navigates:
//! - `ActionKind`: What a leaf does when triggered (application, url, ...)
//! - `Action`: A leaf bound to a key
//! - `Group`: A named set of children bound to a key
//! - `ActionOrGroup`: Sum type over the two node kinds
//!
//! The JSON form mirrors the config file: every node carries a `type` field,
//! `"group"` for groups and an action kind otherwise. Groups nest through
//! their `actions` array. The root is a `Group` without a key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::keymap;

/// Kind of side effect a leaf performs
///
/// The core never performs the effect itself; the kind and value are handed
/// to an `ActionExecutor`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Launch or focus an application bundle / desktop entry
    Application,
    /// Open a URL in the default handler
    Url,
    /// Run a shell command
    Command,
    /// Open a folder in the file manager
    Folder,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Application => write!(f, "application"),
            ActionKind::Url => write!(f, "url"),
            ActionKind::Command => write!(f, "command"),
            ActionKind::Folder => write!(f, "folder"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" => Ok(ActionKind::Application),
            "url" => Ok(ActionKind::Url),
            "command" => Ok(ActionKind::Command),
            "folder" => Ok(ActionKind::Folder),
            other => Err(format!("unknown action type '{}'", other)),
        }
    }
}

/// A leaf node
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Action {
    /// Key that triggers this action (glyph or text token)
    pub key: Option<String>,
    pub kind: ActionKind,
    /// Payload for the executor (path, URL, command line)
    pub value: String,
    pub label: Option<String>,
}

impl Action {
    pub fn new(key: &str, kind: ActionKind, value: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            kind,
            value: value.to_string(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Label if set, otherwise the raw value
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// A composite node
///
/// The root of the config tree is a `Group` with no key.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Optional `+`-joined shortcut that jumps straight into this group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_shortcut: Option<String>,

    #[serde(default, rename = "actions")]
    pub children: Vec<ActionOrGroup>,
}

impl Group {
    /// The empty root used when a config file cannot be parsed
    pub fn empty_root() -> Self {
        Self::default()
    }

    pub fn new(key: &str, children: Vec<ActionOrGroup>) -> Self {
        Self {
            key: Some(key.to_string()),
            children,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_global_shortcut(mut self, shortcut: &str) -> Self {
        self.global_shortcut = Some(shortcut.to_string());
        self
    }

    /// Label if set, otherwise the key glyph
    pub fn display_name(&self) -> &str {
        match (&self.label, &self.key) {
            (Some(label), _) => label.as_str(),
            (None, Some(key)) => keymap::glyph(key),
            (None, None) => "",
        }
    }

    /// Total number of actions beneath this group
    pub fn action_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                ActionOrGroup::Action(_) => 1,
                ActionOrGroup::Group(group) => group.action_count(),
            })
            .sum()
    }
}

/// A node in the config tree
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum ActionOrGroup {
    Action(Action),
    Group(Group),
}

impl ActionOrGroup {
    pub fn key(&self) -> Option<&str> {
        match self {
            ActionOrGroup::Action(action) => action.key.as_deref(),
            ActionOrGroup::Group(group) => group.key.as_deref(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ActionOrGroup::Action(action) => action.label.as_deref(),
            ActionOrGroup::Group(group) => group.label.as_deref(),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            ActionOrGroup::Group(group) => Some(group),
            ActionOrGroup::Action(_) => None,
        }
    }
}

impl From<Action> for ActionOrGroup {
    fn from(action: Action) -> Self {
        ActionOrGroup::Action(action)
    }
}

impl From<Group> for ActionOrGroup {
    fn from(group: Group) -> Self {
        ActionOrGroup::Group(group)
    }
}

impl fmt::Display for ActionOrGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key().map(keymap::glyph).unwrap_or("?");
        match self {
            ActionOrGroup::Action(action) => {
                write!(f, "{} → {} {}", key, action.kind, action.display_name())
            }
            ActionOrGroup::Group(group) => {
                write!(f, "{} → {} ({} actions)", key, group.display_name(), group.action_count())
            }
        }
    }
}

/// On-disk node shape shared by actions and groups
#[derive(Deserialize, Serialize)]
struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,

    #[serde(rename = "type")]
    node_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    global_shortcut: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    actions: Option<Vec<ActionOrGroup>>,
}

const GROUP_TYPE: &str = "group";

impl TryFrom<RawNode> for ActionOrGroup {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.node_type == GROUP_TYPE {
            return Ok(ActionOrGroup::Group(Group {
                key: raw.key,
                label: raw.label,
                global_shortcut: raw.global_shortcut,
                children: raw.actions.unwrap_or_default(),
            }));
        }

        let kind: ActionKind = raw.node_type.parse()?;

        let value = raw
            .value
            .ok_or_else(|| format!("action of type '{}' has no value", raw.node_type))?;

        Ok(ActionOrGroup::Action(Action {
            key: raw.key,
            kind,
            value,
            label: raw.label,
        }))
    }
}

impl From<ActionOrGroup> for RawNode {
    fn from(node: ActionOrGroup) -> Self {
        match node {
            ActionOrGroup::Action(action) => RawNode {
                key: action.key,
                node_type: action.kind.to_string(),
                label: action.label,
                value: Some(action.value),
                global_shortcut: None,
                actions: None,
            },
            ActionOrGroup::Group(group) => RawNode {
                key: group.key,
                node_type: GROUP_TYPE.to_string(),
                label: group.label,
                value: None,
                global_shortcut: group.global_shortcut,
                actions: Some(group.children),
            },
        }
    }
}
