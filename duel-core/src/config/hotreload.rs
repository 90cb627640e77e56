//! File watcher for match tuning.
//!
//! Wraps a `notify` watcher on the config file's directory. `poll()` drains
//! pending filesystem events and, when the watched file changed, reparses
//! and validates it. A broken file is logged and skipped so the previous
//! config stays in force.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use super::{ConfigError, MatchConfig};

pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    current: MatchConfig,
    reload_count: u32,
    last_error: Option<String>,
}

impl ConfigWatcher {
    /// Load `path` once and start watching it
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let current = MatchConfig::load(&path)?;

        let (tx, rx) = channel();
        let mut watcher = notify::recommended_watcher(tx)
            .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Io(std::io::Error::other(e)))?;

        info!(path = ?path, "Watching match config");

        Ok(Self {
            path,
            _watcher: watcher,
            receiver: rx,
            current,
            reload_count: 0,
            last_error: None,
        })
    }

    pub fn current(&self) -> &MatchConfig {
        &self.current
    }

    pub fn reload_count(&self) -> u32 {
        self.reload_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drain watcher events. Returns the new config when the file changed
    /// and parsed cleanly.
    pub fn poll(&mut self) -> Option<MatchConfig> {
        let mut touched = false;
        while let Ok(result) = self.receiver.try_recv() {
            match result {
                Ok(event) => touched |= self.is_config_event(&event),
                Err(e) => warn!("Config watcher error: {}", e),
            }
        }
        if !touched {
            return None;
        }
        self.reload()
    }

    /// Reparse the file now, regardless of watcher events
    pub fn reload(&mut self) -> Option<MatchConfig> {
        match MatchConfig::load(&self.path) {
            Ok(config) => {
                self.reload_count += 1;
                self.last_error = None;
                self.current = config.clone();
                info!(count = self.reload_count, "Match config reloaded");
                Some(config)
            }
            Err(e) => {
                warn!(error = %e, "Match config reload rejected, keeping previous");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn is_config_event(&self, event: &Event) -> bool {
        let relevant_kind = event.kind.is_modify() || matches!(event.kind, EventKind::Create(_));
        let file_name = self.path.file_name();
        relevant_kind && event.paths.iter().any(|p| p.file_name() == file_name)
    }
}
