//! Signal listener: asynchronous OS requests become synchronous state
//! mutations.
//!
//! `extern "C"` handlers may do almost nothing safely, so they only latch a
//! static atomic; a dedicated thread polls the latches on a bounded interval
//! and does the real work.
//!
//! Termination (SIGINT/SIGTERM) routes through the structured shutdown path:
//! flags under the lock, gate release, a `RoundQuit` wake. The controller
//! owns process teardown and exits with status 1 for a signal-triggered
//! shutdown; no worker calls `exit()`.
//!
//! Resize (SIGWINCH) is executed here and only here: re-query the size,
//! update the field, clamp everything back inside it, repaint, all in one
//! critical section, as a resize must be.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::terminal;

use crate::render;
use crate::state::Shared;

use super::messages::Notice;

/// Latched by the termination handler; read by the controller to pick the
/// exit status. Monotonic, never cleared.
static TERMINATE: AtomicBool = AtomicBool::new(false);

/// Set by the SIGWINCH handler or by the input worker forwarding a crossterm
/// resize event; consumed by the listener thread.
static RESIZE: AtomicBool = AtomicBool::new(false);

/// Bounded poll interval of the listener thread.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

extern "C" fn on_terminate(_sig: libc::c_int) {
    TERMINATE.store(true, Ordering::Relaxed);
}

extern "C" fn on_resize(_sig: libc::c_int) {
    RESIZE.store(true, Ordering::Relaxed);
}

/// Ask the listener to run a resize pass.
pub(crate) fn request_resize() {
    RESIZE.store(true, Ordering::Relaxed);
}

/// Whether a termination signal has been delivered at any point.
pub fn termination_signaled() -> bool {
    TERMINATE.load(Ordering::Relaxed)
}

/// The signal listener thread.
pub struct SignalWorker {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl SignalWorker {
    /// Register the handlers and spawn the listener thread.
    pub fn spawn(shared: Arc<Shared>, notices: Sender<Notice>) -> Self {
        Self::register();

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("rally-signals".to_string())
            .spawn(move || {
                Self::run_loop(&shared, &notices, &shutdown_clone);
            })
            .expect("failed to spawn signal thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Stop and join the listener thread.
    pub fn join(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Install the latching handlers. Signals not registered here keep their
    /// default disposition and are thereby ignored by the game.
    #[allow(unsafe_code)]
    fn register() {
        unsafe {
            libc::signal(libc::SIGINT, on_terminate as *const () as libc::sighandler_t);
            libc::signal(libc::SIGTERM, on_terminate as *const () as libc::sighandler_t);
            libc::signal(libc::SIGWINCH, on_resize as *const () as libc::sighandler_t);
        }
    }

    fn run_loop(shared: &Arc<Shared>, notices: &Sender<Notice>, shutdown: &Arc<AtomicBool>) {
        let mut delivered = false;
        while !shutdown.load(Ordering::Relaxed) {
            if TERMINATE.load(Ordering::Relaxed) && !delivered {
                delivered = true;
                log::info!("termination signal received, shutting down");
                {
                    let mut state = shared.lock();
                    state.exit_flag = true;
                    state.termination_flag = true;
                }
                // Wake a worker parked on the modal, then the controller.
                // The send blocks if the channel is full: the flags stop the
                // other producers, so this wake must not be droppable. No
                // lock is held here and the controller always drains.
                shared.pause().release();
                let _ = notices.send(Notice::RoundQuit);
            }

            if RESIZE.swap(false, Ordering::Relaxed) {
                Self::handle_resize(shared);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// One resize pass: new geometry, clamped objects, full repaint, all
    /// under the state lock.
    fn handle_resize(shared: &Arc<Shared>) {
        // A failed size query is treated as an empty poll; the next SIGWINCH
        // retries.
        let Ok((cols, rows)) = terminal::size() else {
            log::warn!("terminal size query failed during resize");
            return;
        };
        log::debug!("resize to {cols}x{rows}");
        let mut state = shared.lock();
        state.apply_resize(cols, rows);
        if let Err(e) = render::repaint(&state) {
            log::warn!("resize repaint failed: {e}");
        }
    }
}
