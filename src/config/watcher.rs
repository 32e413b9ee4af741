// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hot reload of the configuration file.
//!
//! A background thread listens to filesystem events for the file, waits for
//! the writes to settle, then loads and validates it. The UI drains the
//! results between frames, so the selection and port swap can be edited
//! while playing.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use super::ControllerConfig;

/// Quiet period after the last write before reloading
pub const DEFAULT_QUIET: Duration = Duration::from_millis(500);

/// How often an idle watcher thread wakes to notice shutdown
const IDLE_WAKE: Duration = Duration::from_secs(1);

/// Outcome of a reload
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// The file changed and the new contents are valid
    Reloaded(Box<ControllerConfig>),
    /// The file changed but could not be loaded; the old config stays
    Error(String),
}

/// Collapses a burst of file events into one reload
#[derive(Debug)]
struct Debounce {
    quiet: Duration,
    last_change: Option<Instant>,
}

impl Debounce {
    fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_change: None,
        }
    }

    fn touch(&mut self, at: Instant) {
        self.last_change = Some(at);
    }

    /// How long to wait for the next event
    fn wait(&self, now: Instant) -> Duration {
        match self.last_change {
            Some(at) => self.quiet.saturating_sub(now.saturating_duration_since(at)),
            None => IDLE_WAKE,
        }
    }

    /// True once, when a change has been quiet long enough
    fn fire(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(at) if now.saturating_duration_since(at) >= self.quiet => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches one configuration file and reports validated reloads
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<ConfigEvent>,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Start watching `path`.
    ///
    /// The parent directory is watched so editors that save by replacing
    /// the file are still seen.
    ///
    /// # Arguments
    /// * `path` - Configuration file to watch
    /// * `quiet` - Settle time after the last write, [`DEFAULT_QUIET`] if `None`
    pub fn new<P: AsRef<Path>>(path: P, quiet: Option<Duration>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| anyhow!("Not a file path: {:?}", path))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (raw_tx, raw_rx) = mpsc::channel::<Event>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = raw_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch {:?}: {}", dir, e))?;

        let (tx, events) = mpsc::channel();
        let reload_path = path.clone();
        let debounce = Debounce::new(quiet.unwrap_or(DEFAULT_QUIET));
        thread::spawn(move || pump(raw_rx, tx, &reload_path, &file_name, debounce));

        info!("Watching {:?}", path);
        Ok(Self {
            _watcher: watcher,
            events,
            path,
        })
    }

    /// Next pending reload, without blocking
    pub fn try_next(&self) -> Option<ConfigEvent> {
        self.events.try_recv().ok()
    }

    /// Every pending reload, oldest first
    pub fn poll(&self) -> Vec<ConfigEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Turn raw file events into debounced reloads until either channel closes
fn pump(
    raw: Receiver<Event>,
    events: Sender<ConfigEvent>,
    path: &Path,
    file_name: &OsString,
    mut debounce: Debounce,
) {
    loop {
        match raw.recv_timeout(debounce.wait(Instant::now())) {
            Ok(event) if touches(&event, file_name) => debounce.touch(Instant::now()),
            Ok(_) | Err(RecvTimeoutError::Timeout) => {}
            // The watcher was dropped with its ConfigWatcher
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if debounce.fire(Instant::now()) {
            debug!("Reloading {:?}", path);
            if events.send(reload(path)).is_err() {
                break;
            }
        }
    }
}

/// A write or create naming the watched file
fn touches(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn reload(path: &Path) -> ConfigEvent {
    match validate_config(path) {
        Ok(config) => ConfigEvent::Reloaded(Box::new(config)),
        Err(e) => ConfigEvent::Error(format!("Failed to load {:?}: {:#}", path, e)),
    }
}

/// Load and validate a configuration without applying it
pub fn validate_config<P: AsRef<Path>>(path: P) -> Result<ControllerConfig> {
    let config = ControllerConfig::load(path)?;
    config.validate()?;
    Ok(config)
}
