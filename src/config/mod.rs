//! Configuration file management with atomic writes and live reload.
//!
//! Two files live in the config directory (default `~/.config/leader-keys`):
//!
//! - **config.json**: the tree of actions and groups ([`UserConfig`])
//! - **settings.json**: activation shortcut and behaviour flags ([`UserSettings`])
//!
//! Key properties:
//!
//! - **Atomic writes**: temp-file-then-rename, a reader never sees half a file
//! - **Atomic reloads**: the tree is swapped as one `Arc<Group>`
//! - **Parse errors block, validation errors don't**: a malformed file
//!   replaces the tree with an empty root and is reported to the caller;
//!   structural problems are collected and the tree still loads
//!
//! # Example
//!
//! ```no_run
//! use leader_keys::config::UserConfig;
//!
//! let mut config = UserConfig::new("/home/user/.config/leader-keys".into());
//! config.ensure_and_load()?;
//!
//! for error in config.validation_errors() {
//!     println!("{}", error);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod settings;
pub mod watcher;

pub use error::ConfigError;
pub use settings::{
    AutoOpenCheatsheet, CheatsheetSettings, ModifierKeyConfig, ReactivateBehavior, Screen,
    UserSettings,
};
pub use watcher::ConfigWatcher;

use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::core::{validate, Group, ValidationError};

/// File name of the config tree inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default config directory before tilde expansion
pub const DEFAULT_CONFIG_DIR: &str = "~/.config/leader-keys";

/// Tree written on first launch
const DEFAULT_CONFIG: &str = r#"{
  "actions": [
    { "key": "t", "type": "application", "value": "/Applications/Utilities/Terminal.app" },
    {
      "key": "o",
      "type": "group",
      "label": "Open",
      "actions": [
        { "key": "s", "type": "application", "value": "/Applications/Safari.app" },
        { "key": "f", "type": "folder", "value": "~/Downloads" }
      ]
    },
    {
      "key": "r",
      "type": "group",
      "label": "Raycast",
      "actions": [
        { "key": "e", "type": "url", "value": "raycast://extensions/raycast/emoji-symbols/search-emoji-symbols" },
        { "key": "c", "type": "url", "value": "raycast://extensions/raycast/raycast/confetti" }
      ]
    }
  ]
}
"#;

/// Expands `~` and environment variables in a user supplied directory.
pub fn expand_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Writes `content` to `path` atomically.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options().open(path).map_err(|e| {
        ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e))
    })?;

    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}

/// Creates `dir` if needed and checks it can be written to.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|_| ConfigError::DirectoryNotWritable(dir.to_path_buf()))?;
    }

    if dir.metadata()?.permissions().readonly() {
        return Err(ConfigError::DirectoryNotWritable(dir.to_path_buf()));
    }

    Ok(())
}

/// Owns the loaded config tree and its validation results.
///
/// The tree is only ever replaced wholesale; consumers hold an
/// `Arc<Group>` snapshot and never observe a partial update.
#[derive(Debug)]
pub struct UserConfig {
    directory: PathBuf,
    root: Arc<Group>,
    validation_errors: Vec<ValidationError>,
}

impl UserConfig {
    /// Creates an unloaded config rooted at `directory`.
    ///
    /// Nothing touches the disk until `ensure_and_load()` or
    /// `reload_from_file()` is called.
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            root: Arc::new(Group::empty_root()),
            validation_errors: Vec::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of config.json
    pub fn path(&self) -> PathBuf {
        self.directory.join(CONFIG_FILE_NAME)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Current tree snapshot
    pub fn root(&self) -> Arc<Group> {
        Arc::clone(&self.root)
    }

    /// Problems found in the current tree, in pre-order
    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    /// Creates the directory and a default config.json if missing, then loads.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DirectoryNotWritable` when the directory cannot
    /// be created, `ConfigError::Parse` when the file is malformed (the tree
    /// is replaced by the empty root in that case).
    pub fn ensure_and_load(&mut self) -> Result<(), ConfigError> {
        ensure_dir(&self.directory)?;

        let path = self.path();
        if !path.exists() {
            info!(path = %path.display(), "writing default config");
            write_atomic(&path, DEFAULT_CONFIG)?;
        }

        self.reload_from_file()
    }

    /// Re-reads config.json and swaps in the new tree.
    ///
    /// On any read or parse failure the tree becomes the empty root and
    /// the error is returned so the caller can show it once.
    pub fn reload_from_file(&mut self) -> Result<(), ConfigError> {
        match self.read_tree() {
            Ok(root) => {
                self.apply(root);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "config could not be loaded; using empty tree");
                self.apply(Group::empty_root());
                Err(e)
            }
        }
    }

    fn read_tree(&self) -> Result<Group, ConfigError> {
        let path = self.path();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Replaces the tree and recomputes validation errors.
    pub fn apply(&mut self, root: Group) {
        self.validation_errors = validate(&root);
        if !self.validation_errors.is_empty() {
            warn!(count = self.validation_errors.len(), "config has validation issues");
        }
        debug!(actions = root.action_count(), "config tree loaded");
        self.root = Arc::new(root);
    }

    /// Writes the current tree back to config.json.
    pub fn save(&self) -> Result<(), ConfigError> {
        ensure_dir(&self.directory)?;
        let content = serde_json::to_string_pretty(self.root.as_ref())?;
        write_atomic(&self.path(), &content)
    }
}

#[cfg(test)]
mod tests;
