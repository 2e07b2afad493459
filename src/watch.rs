//! Hot reload of the worldgen settings file.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use log::{info, warn};
use notify::{EventKind, RecursiveMode, Watcher};
use strata_worldgen::{WorldGenConfig, load_params_from_path};

/// Watches one worldgen TOML file from a background thread and reparses it on change.
pub struct WorldgenWatcher {
    path: PathBuf,
    rx: Receiver<()>,
}

impl WorldgenWatcher {
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel::<()>();
        let watched = path.clone();
        std::thread::spawn(move || {
            let watcher =
                notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                    if let Ok(event) = res {
                        match event.kind {
                            EventKind::Modify(_)
                            | EventKind::Create(_)
                            | EventKind::Remove(_)
                            | EventKind::Any => {
                                let _ = tx.send(());
                            }
                            _ => {}
                        }
                    }
                });
            let mut watcher = match watcher {
                Ok(w) => w,
                Err(e) => {
                    warn!("worldgen watcher unavailable: {e}");
                    return;
                }
            };
            if let Err(e) = watcher.watch(&watched, RecursiveMode::NonRecursive) {
                warn!("cannot watch {}: {e}", watched.display());
                return;
            }
            loop {
                std::thread::sleep(Duration::from_secs(3600));
            }
        });
        Self { path, rx }
    }

    /// Drains queued change events; when there were any, reparses the file once.
    pub fn poll(&self) -> Option<WorldGenConfig> {
        if self.rx.try_iter().count() == 0 {
            return None;
        }
        if !self.path.exists() {
            warn!("worldgen config missing: {}", self.path.display());
            return None;
        }
        match load_params_from_path(&self.path) {
            Ok(cfg) => {
                info!("worldgen config reloaded from {}", self.path.display());
                Some(cfg)
            }
            Err(e) => {
                warn!("worldgen config reload failed ({}): {e}", self.path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_worldgen::Mode;

    fn temp_file(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("strata-{}-{name}", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn poll_reparses_only_after_an_event() {
        let path = temp_file("wg.toml", "mode = \"flat\"\n[flat]\nthickness = 5\n");
        let (tx, rx) = mpsc::channel();
        let w = WorldgenWatcher {
            path: path.clone(),
            rx,
        };
        assert!(w.poll().is_none());
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        let cfg = w.poll().unwrap();
        assert_eq!(cfg.mode, Mode::Flat);
        assert_eq!(cfg.flat.thickness, 5);
        assert!(w.poll().is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn broken_file_is_ignored() {
        let path = temp_file("bad.toml", "mode = [");
        let (tx, rx) = mpsc::channel();
        let w = WorldgenWatcher { path: path.clone(), rx };
        tx.send(()).unwrap();
        assert!(w.poll().is_none());
        let _ = std::fs::remove_file(path);
    }
}
