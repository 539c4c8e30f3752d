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

//! Action execution
//!
//! # Safety Modes
//!
//! - `DryRun`: records and logs actions, never spawns anything (default,
//!   and what every test uses)
//! - `Live`: spawns the platform opener or a shell; requires explicit intent

use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{Action, ActionExecutor, ActionKind};

/// Action execution errors
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot run action: {0}")]
    Unsupported(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecMode {
    /// Resolve and record only
    #[default]
    DryRun,

    /// Actually launch things
    Live,
}

/// Program that opens files, folders and URLs on this platform
pub fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Runs resolved actions
#[derive(Debug, Default)]
pub struct ActionRunner {
    mode: ExecMode,
    history: Vec<Action>,
}

impl ActionRunner {
    pub fn new(mode: ExecMode) -> Self {
        Self {
            mode,
            history: Vec::new(),
        }
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Every action handed to this runner, in order (both modes)
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    /// Program and arguments that would run `action`
    ///
    /// # Example
    /// ```
    /// use leader_keys::core::{Action, ActionKind};
    /// use leader_keys::executor::ActionRunner;
    ///
    /// let action = Action::new("e", ActionKind::Command, "echo hi");
    /// let (program, args) = ActionRunner::command_line(&action).unwrap();
    /// assert_eq!(program, "sh");
    /// assert_eq!(args, vec!["-c".to_string(), "echo hi".to_string()]);
    /// ```
    pub fn command_line(action: &Action) -> Result<(String, Vec<String>), ExecError> {
        let value = action.value.trim();
        if value.is_empty() {
            return Err(ExecError::Unsupported(format!(
                "{} action has an empty value",
                action.kind
            )));
        }

        let line = match action.kind {
            ActionKind::Command => ("sh".to_string(), vec!["-c".to_string(), value.to_string()]),
            ActionKind::Application if cfg!(target_os = "macos") => (
                opener().to_string(),
                vec!["-a".to_string(), value.to_string()],
            ),
            ActionKind::Application | ActionKind::Url => {
                (opener().to_string(), vec![value.to_string()])
            }
            ActionKind::Folder => (
                opener().to_string(),
                vec![shellexpand::tilde(value).into_owned()],
            ),
        };
        Ok(line)
    }

    /// Spawns the action and reaps it on a detached thread.
    ///
    /// Launched programs outlive the call, but must be waited on or each
    /// one stays a zombie until this process exits.
    fn spawn(action: &Action) -> Result<JoinHandle<Option<ExitStatus>>, ExecError> {
        let (program, args) = Self::command_line(action)?;
        debug!(%program, ?args, "spawning");

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: format!("{} {}", program, args.join(" ")),
                source,
            })?;

        Ok(thread::spawn(move || match child.wait() {
            Ok(status) => {
                debug!(%program, %status, "action exited");
                Some(status)
            }
            Err(e) => {
                warn!(%program, error = %e, "failed to wait for action");
                None
            }
        }))
    }
}

impl ActionExecutor for ActionRunner {
    fn execute(&mut self, action: &Action) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.history.push(action.clone());

        match self.mode {
            ExecMode::DryRun => {
                info!(kind = %action.kind, value = %action.value, "dry run: action not launched");
                Ok(())
            }
            ExecMode::Live => {
                Self::spawn(action)?;
                Ok(())
            }
        }
    }
}
