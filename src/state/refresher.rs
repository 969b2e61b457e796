use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Periodic match-list refresh, every 60 seconds. Only re-requests the
/// list; detail snapshots refresh when the user acts on them.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests }
    }

    pub async fn run(self) {
        let mut list_interval = interval(Duration::from_secs(60));
        // Skip the immediate first tick so startup loading isn't double-triggered.
        list_interval.tick().await;

        loop {
            list_interval.tick().await;
            let _ = self
                .network_requests
                .send(NetworkRequest::LoadMatches)
                .await;
        }
    }
}
