//! Abort watcher: a background thread that rolls back a run's files when an
//! abort arrives.
//!
//! The watcher only ever touches the [`CreationLog`]. An abort is fire and
//! forget: the rollback runs on the watcher thread and closes the log, so a
//! run still in progress fails on its next file. Once the watcher is finished
//! or dropped, later aborts are ignored, which is how
//! [`Generator::generate`](crate::generator::Generator::generate) keeps a
//! completed run. A caller of
//! [`Generator::generate_into`](crate::generator::Generator::generate_into)
//! that owns its watcher decides itself when to finish it; an abort before
//! then rolls back even a run that has already returned.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use tracing::{info, warn};

use crate::rollback::CreationLog;

#[derive(Debug)]
enum WatchEvent {
    Abort,
    #[cfg_attr(not(unix), allow(dead_code))]
    Signal(i32),
    Finish,
}

/// Cloneable trigger for an [`AbortWatcher`].
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Sender<WatchEvent>,
}

impl AbortHandle {
    /// Ask the watcher to roll back. Has no effect once the watcher is gone.
    pub fn abort(&self) {
        if self.tx.send(WatchEvent::Abort).is_err() {
            warn!("abort requested after the watcher finished");
        }
    }
}

pub struct AbortWatcher {
    tx: Sender<WatchEvent>,
    thread: Option<JoinHandle<()>>,
    #[cfg(unix)]
    signals: Option<(signal_hook::iterator::Handle, JoinHandle<()>)>,
}

impl AbortWatcher {
    /// Start a watcher for `log` that reacts to [`AbortHandle::abort`].
    pub fn spawn(log: CreationLog) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread = std::thread::spawn(move || watch(rx, log));
        Self {
            tx,
            thread: Some(thread),
            #[cfg(unix)]
            signals: None,
        }
    }

    /// Like [`AbortWatcher::spawn`], also treating SIGINT and SIGTERM as an
    /// abort. After the rollback the signal's default action runs, so the
    /// process still terminates.
    #[cfg(unix)]
    pub fn with_signals(log: CreationLog) -> std::io::Result<Self> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut watcher = Self::spawn(log);
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let tx = watcher.tx.clone();
        let forwarder = std::thread::spawn(move || {
            if let Some(sig) = signals.forever().next() {
                // The watcher may already be gone; nothing left to undo then.
                let _ = tx.send(WatchEvent::Signal(sig));
            }
        });
        watcher.signals = Some((handle, forwarder));
        Ok(watcher)
    }

    #[cfg(not(unix))]
    pub fn with_signals(log: CreationLog) -> std::io::Result<Self> {
        Ok(Self::spawn(log))
    }

    pub fn handle(&self) -> AbortHandle {
        AbortHandle {
            tx: self.tx.clone(),
        }
    }

    /// Stop watching. Aborts already sent are processed first.
    pub fn finish(self) {}
}

impl Drop for AbortWatcher {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            if let Some((handle, forwarder)) = self.signals.take() {
                handle.close();
                if forwarder.join().is_err() {
                    warn!("signal forwarder panicked");
                }
            }
        }
        // The watch thread may have exited after an abort already.
        let _ = self.tx.send(WatchEvent::Finish);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("abort watcher panicked");
            }
        }
    }
}

fn watch(rx: Receiver<WatchEvent>, log: CreationLog) {
    match rx.recv() {
        Ok(WatchEvent::Abort) => {
            info!("abort requested, rolling back");
            log.rollback();
        }
        Ok(WatchEvent::Signal(sig)) => {
            info!(signal = sig, "interrupted, rolling back");
            log.rollback();
            #[cfg(unix)]
            {
                if let Err(e) = signal_hook::low_level::emulate_default_handler(sig) {
                    warn!(signal = sig, error = %e, "failed to re-raise signal");
                }
            }
        }
        Ok(WatchEvent::Finish) | Err(_) => {}
    }
}
