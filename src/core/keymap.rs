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

//! src/core/keymap.rs
//!
//! Three-way key identity registry
//!
//! Every key the launcher understands has three representations:
//! - **code**: hardware scan code delivered by keyboard events
//! - **glyph**: the symbol shown on screen ("␣", "⎋", "a")
//! - **text**: the ASCII token persisted in config files ("space", "escape")
//!
//! The table is a compile-time constant. Three indices are derived from it
//! once, on first use:
//! - `by_code` holds one entry per physical key. Uppercase letters share the
//!   scan code of their lowercase twin, so only lowercase letters and
//!   non-letters are indexed here.
//! - `by_glyph` and `by_text` hold every logical variant, which is what lets
//!   `a` and `A` be two distinct bindings on one physical key.
//!
//! Lookups never reject unknown input: `glyph()` and `text()` pass it through
//! unchanged so callers can still compare single printable characters that
//! the table does not list.

use std::collections::HashMap;
use std::sync::LazyLock;

/// One row of the key table
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyMapEntry {
    /// Hardware scan code (US ANSI layout)
    pub code: u16,
    /// Display symbol
    pub glyph: &'static str,
    /// Serialisation token
    pub text: &'static str,
    /// Reserved keys cannot be bound in the config tree
    pub reserved: bool,
}

impl KeyMapEntry {
    const fn new(code: u16, glyph: &'static str, text: &'static str, reserved: bool) -> Self {
        Self {
            code,
            glyph,
            text,
            reserved,
        }
    }

    /// Whether this key can be used for bindings
    pub fn is_bindable(&self) -> bool {
        !self.reserved
    }

    fn is_uppercase_letter(&self) -> bool {
        let mut chars = self.glyph.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
    }
}

const fn key(code: u16, glyph: &'static str) -> KeyMapEntry {
    KeyMapEntry::new(code, glyph, glyph, false)
}

/// The static key table
pub const KEY_TABLE: &[KeyMapEntry] = &[
    // Letters (US QWERTY)
    key(0x00, "a"),
    key(0x0B, "b"),
    key(0x08, "c"),
    key(0x02, "d"),
    key(0x0E, "e"),
    key(0x03, "f"),
    key(0x05, "g"),
    key(0x04, "h"),
    key(0x22, "i"),
    key(0x26, "j"),
    key(0x28, "k"),
    key(0x25, "l"),
    key(0x2E, "m"),
    key(0x2D, "n"),
    key(0x1F, "o"),
    key(0x23, "p"),
    key(0x0C, "q"),
    key(0x0F, "r"),
    key(0x01, "s"),
    key(0x11, "t"),
    key(0x20, "u"),
    key(0x09, "v"),
    key(0x0D, "w"),
    key(0x07, "x"),
    key(0x10, "y"),
    key(0x06, "z"),
    // Uppercase letters: same scan codes, distinct glyph/text
    key(0x00, "A"),
    key(0x0B, "B"),
    key(0x08, "C"),
    key(0x02, "D"),
    key(0x0E, "E"),
    key(0x03, "F"),
    key(0x05, "G"),
    key(0x04, "H"),
    key(0x22, "I"),
    key(0x26, "J"),
    key(0x28, "K"),
    key(0x25, "L"),
    key(0x2E, "M"),
    key(0x2D, "N"),
    key(0x1F, "O"),
    key(0x23, "P"),
    key(0x0C, "Q"),
    key(0x0F, "R"),
    key(0x01, "S"),
    key(0x11, "T"),
    key(0x20, "U"),
    key(0x09, "V"),
    key(0x0D, "W"),
    key(0x07, "X"),
    key(0x10, "Y"),
    key(0x06, "Z"),
    // Digits
    key(0x1D, "0"),
    key(0x12, "1"),
    key(0x13, "2"),
    key(0x14, "3"),
    key(0x15, "4"),
    key(0x17, "5"),
    key(0x16, "6"),
    key(0x1A, "7"),
    key(0x1C, "8"),
    key(0x19, "9"),
    // Named keys. Space is bindable; backspace and escape drive the overlay.
    KeyMapEntry::new(36, "↵", "enter", false),
    KeyMapEntry::new(48, "⇥", "tab", false),
    KeyMapEntry::new(49, "␣", "space", false),
    KeyMapEntry::new(51, "⌫", "backspace", true),
    KeyMapEntry::new(53, "⎋", "escape", true),
    KeyMapEntry::new(117, "⌦", "delete", false),
    KeyMapEntry::new(123, "←", "left", false),
    KeyMapEntry::new(124, "→", "right", false),
    KeyMapEntry::new(125, "↓", "down", false),
    KeyMapEntry::new(126, "↑", "up", false),
];

struct KeyIndex {
    by_code: HashMap<u16, KeyMapEntry>,
    by_glyph: HashMap<&'static str, KeyMapEntry>,
    by_text: HashMap<&'static str, KeyMapEntry>,
}

impl KeyIndex {
    fn build(table: &[KeyMapEntry]) -> Self {
        let by_code = table
            .iter()
            .filter(|entry| !entry.is_uppercase_letter())
            .map(|entry| (entry.code, *entry))
            .collect();
        let by_glyph = table.iter().map(|entry| (entry.glyph, *entry)).collect();
        let by_text = table.iter().map(|entry| (entry.text, *entry)).collect();

        Self {
            by_code,
            by_glyph,
            by_text,
        }
    }
}

static INDEX: LazyLock<KeyIndex> = LazyLock::new(|| KeyIndex::build(KEY_TABLE));

/// Looks up the entry for a hardware scan code.
///
/// Letter codes resolve to the lowercase variant.
pub fn entry_by_code(code: u16) -> Option<KeyMapEntry> {
    INDEX.by_code.get(&code).copied()
}

/// Looks up an entry by its display glyph
pub fn entry_by_glyph(glyph: &str) -> Option<KeyMapEntry> {
    INDEX.by_glyph.get(glyph).copied()
}

/// Looks up an entry by its serialisation token
pub fn entry_by_text(text: &str) -> Option<KeyMapEntry> {
    INDEX.by_text.get(text).copied()
}

/// Resolves input given either as a glyph or as a text token
pub fn resolve(input: &str) -> Option<KeyMapEntry> {
    entry_by_glyph(input).or_else(|| entry_by_text(input))
}

/// Canonical display glyph for any key representation.
///
/// Unknown input is returned unchanged.
pub fn glyph(input: &str) -> &str {
    match resolve(input) {
        Some(entry) => entry.glyph,
        None => input,
    }
}

/// Canonical serialisation token for any key representation.
///
/// Unknown input is returned unchanged.
pub fn text(input: &str) -> &str {
    match resolve(input) {
        Some(entry) => entry.text,
        None => input,
    }
}

/// True only for known keys marked reserved
pub fn is_reserved(input: &str) -> bool {
    resolve(input).is_some_and(|entry| entry.reserved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_indices_cover_every_variant() {
        assert_eq!(INDEX.by_glyph.len(), KEY_TABLE.len());
        assert_eq!(INDEX.by_text.len(), KEY_TABLE.len());
        // 26 uppercase letters share codes with their lowercase twins
        assert_eq!(INDEX.by_code.len(), KEY_TABLE.len() - 26);
    }

    #[test]
    fn test_uppercase_detection() {
        assert!(key(0x00, "A").is_uppercase_letter());
        assert!(!key(0x00, "a").is_uppercase_letter());
        assert!(!KeyMapEntry::new(49, "␣", "space", false).is_uppercase_letter());
    }
}
