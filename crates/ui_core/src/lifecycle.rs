//! Process-wide "loaded" signal, raised once the first search UI finishes `init`.

use std::sync::OnceLock;

use tokio::sync::watch;

static LOADED: OnceLock<watch::Sender<bool>> = OnceLock::new();

fn sender() -> &'static watch::Sender<bool> {
    LOADED.get_or_init(|| watch::channel(false).0)
}

pub fn loaded() -> watch::Receiver<bool> {
    sender().subscribe()
}

pub fn is_loaded() -> bool {
    *sender().borrow()
}

/// Returns true only for the call that raised the signal.
pub(crate) fn mark_loaded() -> bool {
    sender().send_if_modified(|loaded| {
        if *loaded {
            false
        } else {
            *loaded = true;
            true
        }
    })
}
