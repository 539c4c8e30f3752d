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

//! Config directory watcher for live reload
//!
//! Uses OS-level file watching via the notify crate. The directory is
//! watched rather than config.json itself: atomic saves replace the file
//! through a rename, which would orphan a watch on the old inode.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver},
};
use tracing::trace;

/// Watches one file inside a directory and reports when it changes
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    file: PathBuf,
}

impl ConfigWatcher {
    /// Starts watching `file`'s parent directory.
    pub fn new(file: PathBuf) -> notify::Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let directory = file.parent().unwrap_or(Path::new(".")).to_path_buf();
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        Ok(ConfigWatcher {
            _watcher: watcher,
            rx,
            file,
        })
    }

    /// The file being watched
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Checks for modification events on the watched file (non-blocking).
    ///
    /// Drains every pending event so one save reports as one change.
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(event_result) = self.rx.try_recv() {
            let Ok(event) = event_result else { continue };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }
            if event.paths.iter().any(|p| p.file_name() == self.file.file_name()) {
                trace!(kind = ?event.kind, "config file event");
                changed = true;
            }
        }
        changed
    }
}
