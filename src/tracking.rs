//! Simulated exhibit tracking session.
//!
//! Stands in for a camera-based scanner: the scan scene starts a session,
//! the user "detects" exhibit codes from the keyboard, and teardown is
//! asynchronous, so the scene's hide task polls [`Tracker::is_safe_to_shut_down`]
//! before the navigation stack is allowed to move on.

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::event::{ListenerHandle, ListenerHub};
use crate::ui::gate::LoadGate;

const WARM_UP: Duration = Duration::from_millis(600);
const COOL_DOWN: Duration = Duration::from_millis(400);

struct Shared {
    running: AtomicBool,
    tracking: AtomicBool,
    safe: AtomicBool,
}

pub struct Tracker {
    shared: Arc<Shared>,
    listeners: ListenerHub<bool>,
    last_tracking: Cell<bool>,
    gate: LoadGate,
    code: RefCell<Option<String>>,
}

impl Tracker {
    pub fn new(gate: LoadGate) -> Self {
        Self {
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                tracking: AtomicBool::new(false),
                safe: AtomicBool::new(true),
            }),
            listeners: ListenerHub::new(),
            last_tracking: Cell::new(false),
            gate,
            code: RefCell::new(None),
        }
    }

    /// Begin a tracking session. Warm-up runs in the background; the load
    /// gate stays busy until it finishes, which keeps the loading scene up.
    pub fn start(&self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("tracking session starting");
        self.shared.safe.store(false, Ordering::SeqCst);
        let token = self.gate.begin();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(WARM_UP).await;
                    token.complete();
                });
            }
            // No runtime (tests): warm up synchronously.
            Err(_) => token.complete(),
        }
    }

    /// End the session. Shutdown is not instantaneous; `is_safe_to_shut_down`
    /// flips only after the cool-down completes.
    pub fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        log::info!("tracking session stopping");
        self.shared.tracking.store(false, Ordering::SeqCst);
        self.code.borrow_mut().take();
        let shared = self.shared.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(COOL_DOWN).await;
                    shared.safe.store(true, Ordering::SeqCst);
                });
            }
            Err(_) => shared.safe.store(true, Ordering::SeqCst),
        }
    }

    /// Forget the current detection without ending the session.
    pub fn reset(&self) {
        self.shared.tracking.store(false, Ordering::SeqCst);
        self.code.borrow_mut().take();
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_tracking(&self) -> bool {
        self.shared.tracking.load(Ordering::SeqCst)
    }

    pub fn is_safe_to_shut_down(&self) -> bool {
        self.shared.safe.load(Ordering::SeqCst)
    }

    pub fn tracked_code(&self) -> Option<String> {
        self.code.borrow().clone()
    }

    /// Feed a detection into the session, as if a code had entered the frame.
    pub fn simulate_detection(&self, code: &str) {
        if !self.is_running() {
            log::warn!("detection {code:?} ignored, no session running");
            return;
        }
        *self.code.borrow_mut() = Some(code.to_string());
        self.shared.tracking.store(true, Ordering::SeqCst);
    }

    /// The tracked code left the frame.
    pub fn simulate_lost(&self) {
        self.shared.tracking.store(false, Ordering::SeqCst);
    }

    pub fn on_tracking_changed<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&bool) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Fire tracking-changed listeners if the flag moved since the last pump.
    /// Called once per render tick on the main thread.
    pub fn pump(&self) {
        let now = self.is_tracking();
        if now != self.last_tracking.get() {
            self.last_tracking.set(now);
            self.listeners.emit(&now);
        }
    }
}
