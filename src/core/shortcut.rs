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

//! src/core/shortcut.rs
//!
//! Global shortcut string parser
//!
//! Shortcuts are written as `+`-joined tokens, e.g. `control+space` or
//! `cmd+shift+o`. The same grammar is used for the activation shortcut in
//! settings.json and for per-group `global_shortcut` fields.
//!
//! # Grammar
//! - Input is lower-cased, then split on `+`
//! - Every token but the last is a modifier; unknown modifiers are ignored
//! - The last token is the key: a named key, `f1`..`f12`, or a single
//!   alphanumeric character known to the key registry
//!
//! Any other final token fails the whole parse. There is no partial result.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{anychar, char, digit1},
    combinator::{all_consuming, map, map_res, value, verify},
    sequence::preceded,
    IResult, Parser,
};
use std::fmt;
use thiserror::Error;

use crate::core::keymap;

/// Shortcut parse errors
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ShortcutParseError {
    #[error("Shortcut string is empty")]
    Empty,

    #[error("Unknown key '{0}' in shortcut")]
    UnknownKey(String),
}

/// Modifier keys accepted in shortcut strings
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Modifier {
    /// command / cmd
    Command,
    /// shift
    Shift,
    /// control / ctrl
    Control,
    /// option / opt / alt
    Option,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Command => write!(f, "command"),
            Modifier::Shift => write!(f, "shift"),
            Modifier::Control => write!(f, "control"),
            Modifier::Option => write!(f, "option"),
        }
    }
}

/// The non-modifier part of a shortcut
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShortcutKey {
    Space,
    Return,
    Tab,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    /// F1 through F12
    Function(u8),
    /// Lowercase letter or digit
    Character(char),
}

impl ShortcutKey {
    /// Hardware scan code, where the key registry knows one
    pub fn code(&self) -> Option<u16> {
        let text = match self {
            ShortcutKey::Space => "space",
            ShortcutKey::Return => "enter",
            ShortcutKey::Tab => "tab",
            ShortcutKey::Escape => "escape",
            // `delete` in shortcut strings names the backspace key
            ShortcutKey::Delete => "backspace",
            ShortcutKey::Up => "up",
            ShortcutKey::Down => "down",
            ShortcutKey::Left => "left",
            ShortcutKey::Right => "right",
            ShortcutKey::Function(_) => return None,
            ShortcutKey::Character(c) => {
                let mut buf = [0u8; 4];
                return keymap::entry_by_text(c.encode_utf8(&mut buf)).map(|entry| entry.code);
            }
        };
        keymap::entry_by_text(text).map(|entry| entry.code)
    }
}

impl fmt::Display for ShortcutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutKey::Space => write!(f, "space"),
            ShortcutKey::Return => write!(f, "enter"),
            ShortcutKey::Tab => write!(f, "tab"),
            ShortcutKey::Escape => write!(f, "escape"),
            ShortcutKey::Delete => write!(f, "delete"),
            ShortcutKey::Up => write!(f, "up"),
            ShortcutKey::Down => write!(f, "down"),
            ShortcutKey::Left => write!(f, "left"),
            ShortcutKey::Right => write!(f, "right"),
            ShortcutKey::Function(n) => write!(f, "f{}", n),
            ShortcutKey::Character(c) => write!(f, "{}", c),
        }
    }
}

/// A parsed global shortcut
///
/// Modifiers are kept sorted and de-duplicated so equal shortcuts compare
/// and hash equal regardless of how they were written.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Shortcut {
    pub modifiers: Vec<Modifier>,
    pub key: ShortcutKey,
}

impl Shortcut {
    pub fn new(mut modifiers: Vec<Modifier>, key: ShortcutKey) -> Self {
        modifiers.sort();
        modifiers.dedup();
        Self { modifiers, key }
    }

    /// Parses a shortcut string, returning `None` on any failure
    pub fn parse(input: &str) -> Option<Self> {
        parse_shortcut(input).ok()
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

/// Parses a `+`-joined shortcut string
///
/// # Example
/// ```
/// use leader_keys::core::shortcut::{parse_shortcut, Modifier, ShortcutKey};
///
/// let shortcut = parse_shortcut("Control+Space").unwrap();
/// assert_eq!(shortcut.modifiers, vec![Modifier::Control]);
/// assert_eq!(shortcut.key, ShortcutKey::Space);
/// ```
pub fn parse_shortcut(input: &str) -> Result<Shortcut, ShortcutParseError> {
    let lowered = input.to_lowercase();
    let tokens: Vec<&str> = lowered.split('+').collect();

    let Some((key_token, modifier_tokens)) = tokens.split_last() else {
        return Err(ShortcutParseError::Empty);
    };
    if key_token.is_empty() && modifier_tokens.is_empty() {
        return Err(ShortcutParseError::Empty);
    }

    let modifiers = modifier_tokens
        .iter()
        .filter_map(|token| all_consuming(parse_modifier).parse(*token).ok())
        .map(|(_, modifier)| modifier)
        .collect();

    let (_, key) = all_consuming(parse_key)
        .parse(*key_token)
        .map_err(|_| ShortcutParseError::UnknownKey(key_token.to_string()))?;

    Ok(Shortcut::new(modifiers, key))
}

/// Parses one modifier token
///
/// Longer synonyms come first within each alternative.
pub fn parse_modifier(input: &str) -> IResult<&str, Modifier> {
    alt((
        value(Modifier::Command, alt((tag("command"), tag("cmd")))),
        value(Modifier::Shift, tag("shift")),
        value(Modifier::Control, alt((tag("control"), tag("ctrl")))),
        value(Modifier::Option, alt((tag("option"), tag("opt"), tag("alt")))),
    ))
    .parse(input)
}

/// Parses the key token
///
/// The order matters: `escape` before `esc`, named keys before the single
/// character fallback, and `f1`..`f12` before the bare letter `f`.
pub fn parse_key(input: &str) -> IResult<&str, ShortcutKey> {
    alt((
        value(ShortcutKey::Space, tag("space")),
        value(ShortcutKey::Return, alt((tag("enter"), tag("return")))),
        value(ShortcutKey::Tab, tag("tab")),
        value(ShortcutKey::Escape, alt((tag("escape"), tag("esc")))),
        value(ShortcutKey::Delete, alt((tag("delete"), tag("backspace")))),
        value(ShortcutKey::Left, tag("left")),
        value(ShortcutKey::Right, tag("right")),
        value(ShortcutKey::Up, tag("up")),
        value(ShortcutKey::Down, tag("down")),
        parse_function_key,
        parse_character_key,
    ))
    .parse(input)
}

fn parse_function_key(input: &str) -> IResult<&str, ShortcutKey> {
    map(
        verify(
            map_res(
                preceded(char('f'), verify(digit1, |digits: &str| !digits.starts_with('0'))),
                |digits: &str| digits.parse::<u8>(),
            ),
            |n: &u8| (1..=12).contains(n),
        ),
        ShortcutKey::Function,
    )
    .parse(input)
}

fn parse_character_key(input: &str) -> IResult<&str, ShortcutKey> {
    // Only characters with a hardware mapping can be registered as hotkeys
    map(
        verify(anychar, |c: &char| {
            let mut buf = [0u8; 4];
            c.is_ascii_alphanumeric() && keymap::entry_by_text(c.encode_utf8(&mut buf)).is_some()
        }),
        ShortcutKey::Character,
    )
    .parse(input)
}
