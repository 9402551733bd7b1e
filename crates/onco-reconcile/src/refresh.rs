//! Background rebuilds of the shared index.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, never, select, tick};
use tracing::{debug, info_span};

use onco_ingest::RowSource;

use crate::shared::SharedIndex;

/// Rebuilds a [`SharedIndex`] on a fixed interval and on demand.
///
/// The worker stops when [`IndexRefresher::shutdown`] is called or the
/// refresher is dropped.
pub struct IndexRefresher {
    trigger: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl IndexRefresher {
    /// Start the worker. `interval` of `None` disables periodic rebuilds;
    /// the index is then only rebuilt through [`IndexRefresher::trigger`].
    pub fn spawn(
        index: Arc<SharedIndex>,
        source: Arc<dyn RowSource>,
        interval: Option<Duration>,
    ) -> std::io::Result<Self> {
        let (trigger_tx, trigger_rx) = bounded::<()>(1);
        let worker = thread::Builder::new()
            .name("index-refresh".to_string())
            .spawn(move || run(&index, source.as_ref(), &trigger_rx, interval))?;
        Ok(Self {
            trigger: Some(trigger_tx),
            worker: Some(worker),
        })
    }

    /// Request a rebuild. Requests arriving while one is pending are merged.
    pub fn trigger(&self) {
        if let Some(trigger) = &self.trigger {
            let _ = trigger.try_send(());
        }
    }

    /// Stop the worker and wait for a running rebuild to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.trigger.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for IndexRefresher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    index: &SharedIndex,
    source: &dyn RowSource,
    trigger: &Receiver<()>,
    interval: Option<Duration>,
) {
    let span = info_span!("index_refresh", source = %source.describe());
    let _guard = span.enter();
    let ticker = interval.map_or_else(never, tick);
    loop {
        let rebuild = select! {
            recv(trigger) -> message => message.is_ok(),
            recv(ticker) -> _ => true,
        };
        if !rebuild {
            debug!("refresh worker stopping");
            break;
        }
        // Failures are logged by `refresh`; the previous index stays active.
        let _ = index.refresh(source);
    }
}
