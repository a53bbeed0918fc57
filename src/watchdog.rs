//! Detects the end of an upload whose client never closes the data connection.
//!
//! A [`TransferWatchdog`] keeps an eye on the size of one file. Once the size has not changed for
//! the configured stability window the upload is considered complete. Besides the completion
//! callback the watchdog publishes [`WatchdogSignal`]s that observers can subscribe to.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// The default time a file's size needs to stay the same before the upload is declared done.
pub const DEFAULT_STABILITY_TIMEOUT: Duration = Duration::from_millis(15_000);

/// The default interval at which size changes are sampled to report write speed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Timing parameters of a [`TransferWatchdog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogConfig {
    /// How long the size must stay unchanged. This is also the interval between completion checks.
    pub stability_timeout: Duration,
    /// How often the file is sampled for `Change` signals.
    pub poll_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        WatchdogConfig {
            stability_timeout: DEFAULT_STABILITY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Signals published while a file is being watched.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchdogSignal {
    /// The file changed. `kbps` is the write rate since the previous size change in KiB/s.
    Change {
        /// The current size of the file
        size: u64,
        /// Instantaneous write rate
        kbps: f64,
    },
    /// The size was stable for the whole window; the watchdog stopped.
    Complete {
        /// The final size of the file
        size: u64,
    },
    /// The file could not be inspected; the watchdog stopped.
    Fail {
        /// Kind of the underlying I/O error
        kind: io::ErrorKind,
        /// Description of the underlying I/O error
        message: String,
    },
}

/// Watches one file for size stability.
#[derive(Debug)]
pub struct TransferWatchdog {
    path: PathBuf,
    signals: broadcast::Sender<WatchdogSignal>,
    task: Option<JoinHandle<()>>,
}

impl TransferWatchdog {
    /// Starts watching `path`. `on_done` is called once, with the final metadata when the upload is
    /// considered complete or with the error that stopped the watchdog. It is never called after
    /// [`close`](TransferWatchdog::close).
    pub fn watch<P, F>(path: P, config: WatchdogConfig, on_done: F) -> TransferWatchdog
    where
        P: Into<PathBuf>,
        F: FnOnce(io::Result<std::fs::Metadata>) + Send + 'static,
    {
        let path = path.into();
        let (signals, _) = broadcast::channel(16);
        let task = tokio::spawn(watch_loop(path.clone(), config, signals.clone(), on_done));
        TransferWatchdog {
            path,
            signals,
            task: Some(task),
        }
    }

    /// The file being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribes to the signals published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WatchdogSignal> {
        self.signals.subscribe()
    }

    /// Stops watching. Calling it more than once has no further effect.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TransferWatchdog {
    fn drop(&mut self) {
        self.close();
    }
}

async fn watch_loop<F>(path: PathBuf, config: WatchdogConfig, signals: broadcast::Sender<WatchdogSignal>, on_done: F)
where
    F: FnOnce(io::Result<std::fs::Metadata>),
{
    let start = Instant::now();
    let mut last_write_time = start;

    // The file may not exist yet, in which case the first check just records a baseline.
    let initial = tokio::fs::metadata(&path).await.ok();
    let mut checked_size = initial.as_ref().map(|m| m.len());
    let mut sampled = initial.as_ref().map(|m| (m.len(), m.modified().ok()));

    let mut check = interval_at(start + config.stability_timeout, config.stability_timeout);
    check.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sample = interval_at(start + config.poll_interval, config.poll_interval);
    sample.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = check.tick() => {
                match tokio::fs::metadata(&path).await {
                    Ok(meta) => {
                        let size = meta.len();
                        let elapsed = Instant::now().duration_since(last_write_time);
                        if checked_size == Some(size) && elapsed > config.stability_timeout {
                            let _ = signals.send(WatchdogSignal::Complete { size });
                            on_done(Ok(meta));
                            return;
                        }
                        checked_size = Some(size);
                    }
                    Err(err) => {
                        let _ = signals.send(WatchdogSignal::Fail {
                            kind: err.kind(),
                            message: err.to_string(),
                        });
                        on_done(Err(err));
                        return;
                    }
                }
            }
            _ = sample.tick() => {
                let Ok(meta) = tokio::fs::metadata(&path).await else {
                    continue;
                };
                let current = (meta.len(), meta.modified().ok());
                let previous = sampled.replace(current);
                if previous == Some(current) {
                    continue;
                }
                let previous_size = previous.map(|(size, _)| size).unwrap_or(0);
                let now = Instant::now();
                let kbps = write_rate(current.0 as f64 - previous_size as f64, now.duration_since(last_write_time));
                if previous.map(|(size, _)| size) != Some(current.0) {
                    last_write_time = now;
                }
                let _ = signals.send(WatchdogSignal::Change { size: current.0, kbps });
            }
        }
    }
}

fn write_rate(size_delta: f64, elapsed: Duration) -> f64 {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms <= 0.0 {
        return 0.0;
    }
    size_delta / elapsed_ms * (1000.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tokio::sync::oneshot;

    fn quick() -> WatchdogConfig {
        WatchdogConfig {
            stability_timeout: Duration::from_millis(300),
            poll_interval: Duration::from_millis(50),
        }
    }

    #[test]
    fn default_config() {
        let config = WatchdogConfig::default();
        assert_eq!(config.stability_timeout, Duration::from_secs(15));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn rate_is_in_kibibytes_per_second() {
        assert_eq!(write_rate(2048.0, Duration::from_secs(1)), 2.0);
        assert_eq!(write_rate(2048.0, Duration::ZERO), 0.0);
    }

    #[tokio::test]
    async fn completes_when_size_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, b"12345").unwrap();

        let (tx, rx) = oneshot::channel();
        let started = std::time::Instant::now();
        let watchdog = TransferWatchdog::watch(&path, quick(), move |result| {
            let _ = tx.send(result.map(|m| m.len()));
        });
        let mut signals = watchdog.subscribe();

        let size = tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap().unwrap();
        assert_eq!(size, 5);
        assert!(started.elapsed() >= Duration::from_millis(300));

        loop {
            match signals.recv().await.unwrap() {
                WatchdogSignal::Complete { size } => {
                    assert_eq!(size, 5);
                    break;
                }
                WatchdogSignal::Change { .. } => continue,
                other => panic!("unexpected signal {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn does_not_complete_while_growing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("growing.bin");
        let mut file = std::fs::File::create(&path).unwrap();

        let (tx, mut rx) = oneshot::channel();
        let _watchdog = TransferWatchdog::watch(&path, quick(), move |result| {
            let _ = tx.send(result.map(|m| m.len()));
        });

        for _ in 0..16 {
            file.write_all(&[0u8; 512]).unwrap();
            file.flush().unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(rx.try_recv().is_err(), "completed while the file was still growing");
        }
        let last_change = std::time::Instant::now();

        let size = tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap().unwrap();
        assert_eq!(size, 16 * 512);
        assert!(last_change.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn reports_change_signals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changing.bin");
        std::fs::write(&path, b"").unwrap();

        let watchdog = TransferWatchdog::watch(&path, quick(), |_| {});
        let mut signals = watchdog.subscribe();
        tokio::time::sleep(Duration::from_millis(20)).await;
        std::fs::write(&path, vec![1u8; 4096]).unwrap();

        let signal = tokio::time::timeout(Duration::from_secs(2), signals.recv()).await.unwrap().unwrap();
        match signal {
            WatchdogSignal::Change { size, kbps } => {
                assert_eq!(size, 4096);
                assert!(kbps > 0.0);
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[tokio::test]
    async fn fails_when_file_disappears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vanishing.bin");
        std::fs::write(&path, b"x").unwrap();

        let (tx, rx) = oneshot::channel();
        let watchdog = TransferWatchdog::watch(&path, quick(), move |result| {
            let _ = tx.send(result.map(|m| m.len()));
        });
        let mut signals = watchdog.subscribe();
        std::fs::remove_file(&path).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
        match signals.recv().await.unwrap() {
            WatchdogSignal::Fail { kind, .. } => assert_eq!(kind, io::ErrorKind::NotFound),
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[tokio::test]
    async fn close_is_idempotent_and_silences_the_callback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.bin");
        std::fs::write(&path, b"x").unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let mut watchdog = TransferWatchdog::watch(&path, quick(), move |_| {
            let _ = tx.send(());
        });
        assert_eq!(watchdog.path(), path.as_path());
        watchdog.close();
        watchdog.close();

        assert!(tokio::time::timeout(Duration::from_millis(800), rx).await.unwrap().is_err());
    }
}
