//! Delayed, coalescing invocation of a downstream action.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Default delay window applied when none is given.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

/// A listener that coalesces rapid upstream changes into a single delayed
/// downstream invocation.
///
/// Every [`fire`](Self::fire) restarts the delay window; the downstream
/// action runs once the window elapses without a further fire, so a burst of
/// N changes inside one window produces exactly one invocation. A zero
/// window degenerates to an immediate inline call on the firing thread.
///
/// An enabled flag gates delivery: while the flag is off, fires are dropped
/// without scheduling anything. The flag is consulted at fire time, not at
/// expiry time.
///
/// # Failure modes
///
/// Dropping the listener while a window is open flushes the pending
/// invocation on the worker thread before it exits.
pub struct TimedListener {
    tx: Option<Sender<()>>,
    enabled: Arc<AtomicBool>,
    window: Duration,
    inline_action: Option<Arc<Mutex<Box<dyn FnMut() + Send>>>>,
}

impl TimedListener {
    /// Wrap `action` with the default 200ms window.
    pub fn new(action: impl FnMut() + Send + 'static) -> Self {
        Self::with_window(action, DEFAULT_WINDOW)
    }

    /// Wrap `action` with an explicit delay window.
    pub fn with_window(action: impl FnMut() + Send + 'static, window: Duration) -> Self {
        let enabled = Arc::new(AtomicBool::new(true));
        let action: Arc<Mutex<Box<dyn FnMut() + Send>>> = Arc::new(Mutex::new(Box::new(action)));

        if window.is_zero() {
            return Self {
                tx: None,
                enabled,
                window,
                inline_action: Some(action),
            };
        }

        let (tx, rx) = mpsc::channel::<()>();
        let worker_action = Arc::clone(&action);
        thread::spawn(move || {
            let invoke = || {
                if let Ok(mut action) = worker_action.lock() {
                    action();
                }
            };
            // Outer recv blocks until the next burst begins; inner
            // recv_timeout restarts the window on every further tick.
            while rx.recv().is_ok() {
                loop {
                    match rx.recv_timeout(window) {
                        Ok(()) => continue,
                        Err(RecvTimeoutError::Timeout) => {
                            invoke();
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            invoke();
                            return;
                        }
                    }
                }
            }
        });

        Self {
            tx: Some(tx),
            enabled,
            window,
            inline_action: None,
        }
    }

    /// Signal an upstream change.
    pub fn fire(&self) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        if let Some(action) = &self.inline_action {
            if let Ok(mut action) = action.lock() {
                action();
            }
            return;
        }
        if let Some(tx) = &self.tx {
            // Worker gone means nothing left to invoke.
            let _ = tx.send(());
        }
    }

    /// Turn delivery on or off. Fires while off are dropped.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// A cloneable handle to the enabled flag, for wiring the gate to
    /// another observable.
    #[must_use]
    pub fn enabled_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.enabled)
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl std::fmt::Debug for TimedListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedListener")
            .field("window", &self.window)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
