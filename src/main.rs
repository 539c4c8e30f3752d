//! CLI entry point for leader-keys
//!
//! Provides a command-line interface for checking and listing the config
//! tree, resolving key sequences, and running an interactive session.

use clap::{Parser, Subcommand};
use colored::*;
use leader_keys::config::{self, ConfigError, ConfigWatcher, UserConfig, UserSettings};
use leader_keys::core::{find_item, ActionOrGroup, Group, ItemRef, KeyOutcome, Navigator};
use leader_keys::executor::{ActionRunner, ExecMode};
use leader_keys::hotkeys::{bind_hotkeys, BindingReport, HotkeyTable};
use leader_keys::logging;
use leader_keys::session::{Session, SessionEvent};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How often the watcher thread polls for file events
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "leader-keys")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding config.json and settings.json
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_DIR)]
    config_dir: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config tree
    Check,

    /// Print the config tree
    List,

    /// Resolve a key sequence from the root without launching anything
    Press {
        /// Keys as glyphs or names, e.g. `o s` or `o space`
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Run a session driven by stdin
    Run {
        /// Actually launch actions instead of printing them
        #[arg(long)]
        live: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let directory = config::expand_dir(&cli.config_dir);

    match cli.command {
        Commands::Check => check_config(directory)?,
        Commands::List => list_tree(directory)?,
        Commands::Press { keys } => press_keys(directory, &keys)?,
        Commands::Run { live } => run_session(directory, live)?,
    }

    Ok(())
}

/// Loads config.json, creating the default on first use.
///
/// A parse failure is shown once and the empty tree is used.
fn load_config(directory: PathBuf) -> anyhow::Result<UserConfig> {
    let mut user_config = UserConfig::new(directory);
    println!("{} Loading config: {}", "→".cyan(), user_config.path().display());

    match user_config.ensure_and_load() {
        Ok(()) => {}
        Err(e @ ConfigError::Parse { .. }) => {
            println!("{} {}", "✗".red().bold(), e.to_string().red());
            println!("{}", "⚠ Using an empty tree until the file is fixed".yellow());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(user_config)
}

/// Check config for structural problems
fn check_config(directory: PathBuf) -> anyhow::Result<()> {
    let mut user_config = UserConfig::new(directory);
    println!("{} Checking config: {}", "→".cyan(), user_config.path().display());

    if let Err(e) = user_config.reload_from_file() {
        println!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }

    let root = user_config.root();
    println!("{} Found {} actions\n", "✓".green(), root.action_count());

    let errors = user_config.validation_errors();
    if errors.is_empty() {
        println!("{} {}", "✓".green().bold(), "No problems detected!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} problem{}:\n",
        "✗".red().bold(),
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );

    for error in errors {
        let item = match find_item(&root, &error.path) {
            Some(ItemRef::Action(action)) => format!("action {}", action.display_name()),
            Some(ItemRef::Group(group)) => format!("group {}", group.display_name()),
            None => "?".to_string(),
        };
        println!(
            "  {} {} {}",
            format!("{}", error).yellow(),
            "→".dimmed(),
            item.dimmed()
        );
    }

    std::process::exit(1);
}

/// List the config tree
fn list_tree(directory: PathBuf) -> anyhow::Result<()> {
    let user_config = load_config(directory)?;
    let root = user_config.root();

    println!("{}", format!("{} actions\n", root.action_count()).bold());
    print_group(&root, 0);

    Ok(())
}

fn print_group(group: &Group, depth: usize) {
    let indent = "  ".repeat(depth);
    for child in &group.children {
        let key = child.key().map(leader_keys::core::keymap::glyph).unwrap_or("?");
        match child {
            ActionOrGroup::Group(inner) => {
                let shortcut = inner
                    .global_shortcut
                    .as_deref()
                    .map(|s| format!(" [{}]", s))
                    .unwrap_or_default();
                println!(
                    "{}{} {}{}",
                    indent,
                    key.cyan().bold(),
                    inner.display_name().bold(),
                    shortcut.magenta()
                );
                print_group(inner, depth + 1);
            }
            ActionOrGroup::Action(action) => {
                println!(
                    "{}{} {} {}",
                    indent,
                    key.cyan().bold(),
                    format!("{}", action.kind).green(),
                    action.display_name()
                );
            }
        }
    }
}

/// Feed keys to a navigator in dry-run mode
fn press_keys(directory: PathBuf, keys: &[String]) -> anyhow::Result<()> {
    let user_config = load_config(directory)?;
    let mut navigator = Navigator::new(user_config.root());
    let mut runner = ActionRunner::new(ExecMode::DryRun);

    for key in keys {
        let outcome = navigator.handle_key(key, true, &mut runner);
        print_outcome(&outcome);
        if !navigator.is_idle() {
            println!("  {}", navigator.breadcrumbs().join(" › ").bold());
        }
    }

    Ok(())
}

fn print_outcome(outcome: &KeyOutcome) {
    match outcome {
        KeyOutcome::Descended { glyph, path } => {
            println!(
                "{} {} {}",
                glyph.cyan().bold(),
                "→".dimmed(),
                format!("depth {}", path.len()).dimmed()
            );
        }
        KeyOutcome::Triggered { action, executed, .. } => {
            println!(
                "{} {} {} {}{}",
                "✓".green().bold(),
                format!("{}", action.kind).green(),
                action.display_name(),
                action.value.dimmed(),
                if *executed { "" } else { " (not run)" }
            );
        }
        KeyOutcome::Miss { glyph } => {
            println!("{} {} {}", "✗".red(), glyph.red(), "no binding".dimmed());
        }
    }
}

/// Run a session: stdin lines become events, config changes reload
fn run_session(directory: PathBuf, live: bool) -> anyhow::Result<()> {
    let mut user_config = load_config(directory)?;
    let settings = UserSettings::load(user_config.directory())?;

    let hotkeys = Arc::new(Mutex::new(HotkeyTable::new()));
    {
        let mut table = hotkeys
            .lock()
            .map_err(|_| anyhow::anyhow!("hotkey table poisoned"))?;
        let report = bind_hotkeys(&mut *table, &settings, &user_config.root())?;
        print_report(&report);
    }

    let mode = if live { ExecMode::Live } else { ExecMode::DryRun };
    if live {
        println!("{}", "⚠ Live mode: actions will be launched".yellow());
    }
    println!(
        "{}",
        "Commands: :activate :reset :dismiss :quit @<shortcut>, anything else is keys".dimmed()
    );

    let initial_root = user_config.root();
    let (tx, rx) = channel();

    spawn_stdin_reader(tx.clone(), Arc::clone(&hotkeys));

    let watcher = ConfigWatcher::new(user_config.path())?;
    let watch_settings = settings.clone();
    let watch_tx = tx;
    thread::spawn(move || loop {
        thread::sleep(WATCH_POLL_INTERVAL);
        if !watcher.check_for_changes() {
            continue;
        }

        match user_config.reload_from_file() {
            Ok(()) => println!("{} Config reloaded", "↻".cyan()),
            Err(e) => println!("{} {}", "✗".red().bold(), e),
        }
        for error in user_config.validation_errors() {
            println!("  {}", format!("{}", error).yellow());
        }
        if let Ok(mut table) = hotkeys.lock() {
            match bind_hotkeys(&mut *table, &watch_settings, &user_config.root()) {
                Ok(report) => print_report(&report),
                Err(e) => println!("{} {}", "✗".red().bold(), e),
            }
        }
        if watch_tx.send(SessionEvent::Reload(user_config.root())).is_err() {
            break;
        }
    });

    let mut session = Session::new(initial_root, settings, ActionRunner::new(mode));
    session.run(&rx, print_outcome);

    Ok(())
}

fn spawn_stdin_reader(tx: Sender<SessionEvent>, hotkeys: Arc<Mutex<HotkeyTable>>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for event in parse_line(line.trim(), &hotkeys) {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(SessionEvent::Shutdown);
    });
}

/// Turns one stdin line into session events
fn parse_line(line: &str, hotkeys: &Mutex<HotkeyTable>) -> Vec<SessionEvent> {
    match line {
        "" => Vec::new(),
        ":activate" => vec![SessionEvent::Activate],
        ":reset" => vec![SessionEvent::Reset],
        ":dismiss" => vec![SessionEvent::Dismiss],
        ":quit" => vec![SessionEvent::Shutdown],
        _ => {
            if let Some(shortcut) = line.strip_prefix('@') {
                let event = hotkeys.lock().ok().and_then(|table| table.event_for(shortcut));
                if event.is_none() {
                    println!("{} {} {}", "✗".red(), shortcut.red(), "is not registered".dimmed());
                }
                return event.into_iter().collect();
            }
            line.split_whitespace()
                .map(|key| SessionEvent::KeyPressed {
                    key: key.to_string(),
                    execute: true,
                })
                .collect()
        }
    }
}

fn print_report(report: &BindingReport) {
    let fallback = if report.activation_fallback {
        " (fallback)".yellow().to_string()
    } else {
        String::new()
    };
    println!(
        "{} Activation: {}{}",
        "⌨".cyan(),
        report.activation.to_string().cyan().bold(),
        fallback
    );
    for (shortcut, keys) in &report.groups {
        println!("  {} {} {}", shortcut.to_string().magenta(), "→".dimmed(), keys.join(" "));
    }
    for skipped in &report.skipped {
        println!(
            "  {} {} ({}): {}",
            "✗".red(),
            skipped.shortcut.red(),
            skipped.group,
            skipped.reason.dimmed()
        );
    }
}
