//! The watch loop.
//!
//! One task owns the service and is the only writer of the history. Every
//! source of change is an arm of the same `select!`:
//! - the poll interval samples the clipboard
//! - the screenshot watcher reports image paths as they appear
//! - each appearance starts a settle timer, the path is ingested when it fires
//! - the shutdown future ends the loop
//!
//! Settle timers run in a JoinSet and are aborted on shutdown, so nothing
//! outlives `run`.

use std::future::Future;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::capture::screenshots::ScreenshotWatcher;
use crate::capture::ClipboardSource;
use crate::config::Config;
use crate::error::Result;
use crate::service::Service;
use crate::store::KeyValueStore;
use crate::util;

pub async fn run<S, C, F>(service: &mut Service<S>, clipboard: &mut C, config: &Config, shutdown: F) -> Result<()>
where
    S: KeyValueStore,
    C: ClipboardSource + ?Sized,
    F: Future<Output = ()>,
{
    let (created_tx, mut created_rx) = mpsc::unbounded_channel::<PathBuf>();
    let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<PathBuf>();

    let watcher = match &config.watch_dir {
        Some(dir) => match ScreenshotWatcher::start(dir, created_tx) {
            Ok(watcher) => {
                info!("watching {} for screenshots", dir.display());
                Some(watcher)
            }
            Err(e) => {
                warn!("screenshot watching disabled, could not watch {}: {e}", dir.display());
                None
            }
        },
        None => {
            drop(created_tx);
            None
        }
    };

    let mut ticker = time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut settling: JoinSet<()> = JoinSet::new();

    service.get_history();
    info!(
        "recording clipboard every {} ({} entries in history)",
        humantime::format_duration(config.poll_interval),
        service.history().len()
    );

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
            _ = ticker.tick() => {
                service.poll(clipboard);
            }
            Some(path) = created_rx.recv() => {
                debug!("{} appeared, waiting for it to settle", path.display());
                let tx = settled_tx.clone();
                let delay = config.settle_delay;
                settling.spawn(async move {
                    time::sleep(delay).await;
                    let _ = tx.send(path);
                });
            }
            Some(path) = settled_rx.recv() => {
                service.ingest_screenshot(&path, config.recency_window);
            }
            Some(joined) = settling.join_next(), if !settling.is_empty() => {
                if let Err(e) = joined {
                    debug!("settle timer ended early: {e}");
                }
            }
        }
    }

    drop(ticker);
    if let Some(watcher) = watcher {
        if let Err(e) = watcher.stop() {
            debug!("failed to stop screenshot watcher: {e}");
        }
    }
    settling.abort_all();

    if let Some(usage) = memory_stats::memory_stats() {
        debug!("resident memory at shutdown: {}", util::format_bytes(usage.physical_mem as u64));
    }

    Ok(())
}
