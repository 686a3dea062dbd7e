use crate::input::{spawn_input_thread, InputAction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// The input thread plus the receiving end of its action channel.
pub struct InputRuntime {
    rx: UnboundedReceiver<InputAction>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputRuntime {
    /// Start polling the terminal every `poll_interval`.
    pub fn start(poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = spawn_input_thread(tx, Arc::clone(&shutdown), poll_interval);
        Self {
            rx,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Wait up to `tick` for input and drain everything already queued.
    ///
    /// Returns `None` once the input thread has gone away.
    pub async fn next_batch(&mut self, tick: Duration) -> Option<Vec<InputAction>> {
        match tokio::time::timeout(tick, self.rx.recv()).await {
            Ok(Some(first)) => {
                let mut actions = vec![first];
                while let Ok(action) = self.rx.try_recv() {
                    actions.push(action);
                }
                Some(actions)
            }
            Ok(None) => None,
            // Tick elapsed with no input.
            Err(_) => Some(Vec::new()),
        }
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("input thread panicked");
            }
        }
    }
}

impl Drop for InputRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}
