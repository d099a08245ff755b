use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::poller::Poller;

pub mod high_load;
pub mod monitor;
pub mod nodes;
mod row;
mod slice;
mod store;

pub use high_load::{HighLoadSnapshot, HighLoadSummary, HighLoadView};
pub use monitor::{MonitorSnapshot, MonitorView};
pub use nodes::{NodesSnapshot, NodesView, SystemEntry};
pub use row::SystemRow;
pub use slice::Slice;
pub use store::ViewStore;

/// A dashboard screen: one refresh merges every endpoint it reads into a new
/// snapshot.
pub trait View: Send + Sync + 'static {
    const NAME: &'static str;

    /// Fetch and merge. Returns whether the snapshot changed.
    fn refresh(&self) -> impl Future<Output = bool> + Send;

    /// Stop accepting completions.
    fn teardown(&self);
}

/// A view with a live poller attached.
#[derive(Debug)]
pub struct Mounted<V: View> {
    view: Arc<V>,
    poller: Poller,
}

/// Refresh `view` now and then every `interval` until unmounted.
pub fn mount<V: View>(view: Arc<V>, interval: Duration) -> Mounted<V> {
    let v = view.clone();
    let poller = Poller::start(V::NAME, interval, move || {
        let v = v.clone();
        async move {
            v.refresh().await;
        }
    });
    Mounted { view, poller }
}

impl<V: View> Mounted<V> {
    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    pub fn ticks(&self) -> u64 {
        self.poller.ticks()
    }

    /// Stop polling, then drop whatever is still in flight.
    pub async fn unmount(self) {
        self.poller.stop().await;
        self.view.teardown();
        info!("[VIEW] {} unmounted", V::NAME);
    }
}
