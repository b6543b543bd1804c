//! Input worker: keyboard and pointer events become paddle moves and intents.
//!
//! Runs for the life of the game, guarded by `termination_flag`. Events are
//! read without the state lock (crossterm reads touch no simulation state)
//! and dispatched under it, so no other worker can observe a half-applied
//! input. Notices are sent only after the lock drops.
//!
//! While the pause gate is engaged the world is frozen: movement is
//! suppressed and only resume (space) and quit act, which routes a quit
//! during the level modal through the same cancellation path as everywhere
//! else.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

use crate::state::Shared;

use super::messages::Notice;
use super::signals;

/// How long one poll waits before re-checking `termination_flag`.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// The input thread.
pub struct InputWorker {
    handle: Option<JoinHandle<()>>,
}

impl InputWorker {
    /// Spawn the input thread.
    pub fn spawn(shared: Arc<Shared>, notices: Sender<Notice>) -> Self {
        let handle = thread::Builder::new()
            .name("rally-input".to_string())
            .spawn(move || {
                Self::run_loop(&shared, &notices);
            })
            .expect("failed to spawn input thread");

        Self {
            handle: Some(handle),
        }
    }

    /// Whether the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the input thread to finish. Set `termination_flag` first.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(shared: &Arc<Shared>, notices: &Sender<Notice>) {
        loop {
            if shared.lock().termination_flag {
                return;
            }
            match event::poll(POLL_TIMEOUT) {
                Ok(true) => match event::read() {
                    Ok(ev) => Self::dispatch(shared, notices, &ev),
                    // Transient read failures are noise, not errors.
                    Err(e) => log::warn!("input read failed: {e}"),
                },
                Ok(false) => {}
                Err(e) => log::warn!("input poll failed: {e}"),
            }
        }
    }

    /// Apply one event to the shared state and pick the notice to send.
    fn dispatch(shared: &Arc<Shared>, notices: &Sender<Notice>, ev: &Event) {
        let paused = shared.pause().is_engaged();
        let notice = match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let quit = key.code == KeyCode::Char('q')
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL));
                if quit {
                    shared.lock().exit_flag = true;
                    // Wake anyone parked on the modal, then the controller.
                    shared.pause().release();
                    Some(Notice::RoundQuit)
                } else {
                    match key.code {
                        KeyCode::Up if !paused => {
                            shared.lock().nudge_paddle(-1);
                            Some(Notice::KeyboardMoved)
                        }
                        KeyCode::Down if !paused => {
                            shared.lock().nudge_paddle(1);
                            Some(Notice::KeyboardMoved)
                        }
                        KeyCode::Char(' ') => {
                            if paused {
                                shared.pause().release();
                            } else {
                                shared.lock().play_flag = true;
                            }
                            None
                        }
                        _ => None,
                    }
                }
            }
            Event::Mouse(mouse)
                if !paused
                    && matches!(
                        mouse.kind,
                        MouseEventKind::Moved | MouseEventKind::Drag(_)
                    ) =>
            {
                shared.lock().set_paddle_row(i32::from(mouse.row));
                Some(Notice::KeyboardMoved)
            }
            // The resize executor is the signal listener; crossterm may own
            // the OS-level SIGWINCH handler, so forward its event there.
            Event::Resize(_, _) => {
                signals::request_resize();
                None
            }
            _ => None,
        };

        // The quit notice is unconditional: it must wake a consumer blocked
        // on the channel even when no game activity is pending.
        if let Some(notice) = notice {
            log::trace!("input: {}", notice.label());
            let _ = notices.send(notice);
        }
    }
}
