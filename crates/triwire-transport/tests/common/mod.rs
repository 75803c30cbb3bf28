//! Shared helpers for the integration tests.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};

use tracing_subscriber::EnvFilter;

use triwire_transport::{DataCallback, StatusCallback, StatusCode, StatusEvent};

/// Install a test subscriber once; repeated calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Channel-backed consumer callbacks, so tests can assert on what the
/// transport delivered.
pub fn recording_callbacks() -> (
    StatusCallback,
    DataCallback,
    Receiver<StatusCode>,
    Receiver<Vec<u8>>,
) {
    let (status_tx, status_rx) = channel();
    let (data_tx, data_rx) = channel();

    let status: StatusCallback = Arc::new(move |event: &StatusEvent| {
        let _ = status_tx.send(event.code);
    });
    let data: DataCallback = Arc::new(move |bytes: &[u8]| {
        let _ = data_tx.send(bytes.to_vec());
    });

    (status, data, status_rx, data_rx)
}
