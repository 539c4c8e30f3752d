//! User settings (settings.json)
//!
//! Settings are an explicit value: loaded once, then passed to whoever
//! needs them (hotkey binder, session). Loading is lenient. Missing keys
//! and unrecognised enum values keep their defaults, and an unreadable
//! file leaves every value at its default.

use serde_json::{json, Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::{ensure_dir, write_atomic, ConfigError};

/// File name of the settings inside the config directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Activation shortcut used when none is configured or it fails to parse
pub const DEFAULT_ACTIVATION_SHORTCUT: &str = "control+space";

/// Implements `Display`/`FromStr` over the settings.json spelling.
macro_rules! settings_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($name::$variant => write!(f, $text),)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

/// What activating an already focused session does
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReactivateBehavior {
    /// Hide the overlay
    #[default]
    Hide,
    /// Return to the root, keep the overlay open
    Reset,
    /// Ignore the activation
    Nothing,
}

settings_enum!(ReactivateBehavior {
    Hide => "hide",
    Reset => "reset",
    Nothing => "nothing",
});

/// Which screen the overlay appears on
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Screen {
    #[default]
    Primary,
    Mouse,
    ActiveWindow,
}

settings_enum!(Screen {
    Primary => "primary",
    Mouse => "mouse",
    ActiveWindow => "active_window",
});

/// Which modifier runs group sequences and which enables sticky mode
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ModifierKeyConfig {
    #[default]
    ControlGroupOptionSticky,
    OptionGroupControlSticky,
}

settings_enum!(ModifierKeyConfig {
    ControlGroupOptionSticky => "control_group_option_sticky",
    OptionGroupControlSticky => "option_group_control_sticky",
});

/// When the cheatsheet opens on its own
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AutoOpenCheatsheet {
    Always,
    #[default]
    AfterDelay,
    Never,
}

settings_enum!(AutoOpenCheatsheet {
    Always => "always",
    AfterDelay => "after_delay",
    Never => "never",
});

/// Cheatsheet display flags
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheatsheetSettings {
    pub auto_open: AutoOpenCheatsheet,
    pub delay_ms: u64,
    pub expand_groups: bool,
    pub show_app_icons: bool,
    pub show_favicons: bool,
    pub show_details: bool,
}

impl Default for CheatsheetSettings {
    fn default() -> Self {
        Self {
            auto_open: AutoOpenCheatsheet::default(),
            delay_ms: 2000,
            expand_groups: false,
            show_app_icons: true,
            show_favicons: true,
            show_details: true,
        }
    }
}

/// Contents of settings.json
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserSettings {
    pub activation_shortcut: String,
    pub modifier_keys: ModifierKeyConfig,
    pub cheatsheet: CheatsheetSettings,
    pub reactivate_behavior: ReactivateBehavior,
    pub screen: Screen,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            activation_shortcut: DEFAULT_ACTIVATION_SHORTCUT.to_string(),
            modifier_keys: ModifierKeyConfig::default(),
            cheatsheet: CheatsheetSettings::default(),
            reactivate_behavior: ReactivateBehavior::default(),
            screen: Screen::default(),
        }
    }
}

impl UserSettings {
    /// Path of settings.json inside `directory`
    pub fn path_in(directory: &Path) -> PathBuf {
        directory.join(SETTINGS_FILE_NAME)
    }

    /// Loads settings from `directory`.
    ///
    /// A missing file is created with defaults. A file that cannot be read
    /// or parsed leaves all values at their defaults; only failing to write
    /// the initial defaults is an error.
    pub fn load(directory: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(directory);
        let mut settings = Self::default();

        if !path.exists() {
            settings.save(directory)?;
            return Ok(settings);
        }

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(Value::Object(map)) => settings.apply(&map),
            Ok(_) => warn!(path = %path.display(), "settings.json is not an object; using defaults"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to load settings.json"),
        }

        Ok(settings)
    }

    /// Overlays recognised values from a parsed settings object.
    pub fn apply(&mut self, json: &Map<String, Value>) {
        if let Some(v) = json.get("activation_shortcut").and_then(Value::as_str) {
            self.activation_shortcut = v.to_string();
        }
        if let Some(v) = parse_field(json, "modifier_keys") {
            self.modifier_keys = v;
        }
        if let Some(Value::Object(cheatsheet)) = json.get("cheatsheet") {
            let sheet = &mut self.cheatsheet;
            if let Some(v) = parse_field(cheatsheet, "auto_open") {
                sheet.auto_open = v;
            }
            if let Some(v) = cheatsheet.get("delay_ms").and_then(Value::as_u64) {
                if v > 0 {
                    sheet.delay_ms = v;
                }
            }
            let flags = [
                ("expand_groups", &mut sheet.expand_groups),
                ("show_app_icons", &mut sheet.show_app_icons),
                ("show_favicons", &mut sheet.show_favicons),
                ("show_details", &mut sheet.show_details),
            ];
            for (name, slot) in flags {
                if let Some(v) = cheatsheet.get(name).and_then(Value::as_bool) {
                    *slot = v;
                }
            }
        }
        if let Some(v) = parse_field(json, "reactivate_behavior") {
            self.reactivate_behavior = v;
        }
        if let Some(v) = parse_field(json, "screen") {
            self.screen = v;
        }
    }

    /// JSON form as written to disk
    pub fn to_json(&self) -> Value {
        json!({
            "activation_shortcut": self.activation_shortcut,
            "modifier_keys": self.modifier_keys.to_string(),
            "cheatsheet": {
                "auto_open": self.cheatsheet.auto_open.to_string(),
                "delay_ms": self.cheatsheet.delay_ms,
                "expand_groups": self.cheatsheet.expand_groups,
                "show_app_icons": self.cheatsheet.show_app_icons,
                "show_favicons": self.cheatsheet.show_favicons,
                "show_details": self.cheatsheet.show_details,
            },
            "reactivate_behavior": self.reactivate_behavior.to_string(),
            "screen": self.screen.to_string(),
        })
    }

    /// Writes settings.json atomically (keys sorted, pretty printed).
    pub fn save(&self, directory: &Path) -> Result<(), ConfigError> {
        ensure_dir(directory)?;
        let content = serde_json::to_string_pretty(&self.to_json())?;
        write_atomic(&Self::path_in(directory), &content)?;
        debug!(directory = %directory.display(), "settings saved");
        Ok(())
    }
}

/// Reads a string field and parses it, ignoring unknown values.
fn parse_field<T: FromStr<Err = String>>(json: &Map<String, Value>, key: &str) -> Option<T> {
    let raw = json.get(key)?.as_str()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(field = key, error = %e, "ignoring invalid setting");
            None
        }
    }
}
