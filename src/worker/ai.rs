//! AI worker: proportional pursuit of the ball.
//!
//! One row per tick toward the ball, at a fixed rate that does not scale with
//! the level: the gap between AI speed and ball speed is the difficulty
//! curve. Persists across rounds; `termination_flag` ends it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::state::Shared;

use super::messages::Notice;

/// The AI thread.
pub struct AiWorker {
    handle: Option<JoinHandle<()>>,
}

impl AiWorker {
    /// Spawn the AI thread with a fixed tick interval.
    pub fn spawn(shared: Arc<Shared>, notices: Sender<Notice>, tick: Duration) -> Self {
        let handle = thread::Builder::new()
            .name("rally-ai".to_string())
            .spawn(move || {
                Self::run_loop(&shared, &notices, tick);
            })
            .expect("failed to spawn ai thread");

        Self {
            handle: Some(handle),
        }
    }

    /// Whether the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the AI thread to finish. Set `termination_flag` first.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(shared: &Arc<Shared>, notices: &Sender<Notice>, tick: Duration) {
        loop {
            if shared.lock().termination_flag {
                return;
            }
            shared.pause().wait_released();
            {
                let mut state = shared.lock();
                if state.termination_flag {
                    return;
                }
                state.pursue_ball();
            }
            let _ = notices.send(Notice::AiMoved);
            thread::sleep(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameState, Side};
    use crossbeam_channel::bounded;
    use std::time::Instant;

    #[test]
    fn test_ai_steps_toward_ball_and_notifies() {
        let shared = {
            let mut state = GameState::new(80, 21);
            state.ai_paddle_pos = 5;
            state.ball_y = 15;
            Arc::new(Shared::new(state))
        };
        let (tx, rx) = bounded(8);

        let worker = AiWorker::spawn(shared.clone(), tx, Duration::from_millis(5));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Notice::AiMoved
        );
        {
            let state = shared.lock();
            let row = state.paddle_row(Side::Ai);
            assert!(row > 5, "paddle must chase the ball");
            assert!(row <= state.ball_y, "pursuit never overshoots the ball");
            let moved = row - state.paddle_row_old(Side::Ai);
            assert!((0..=1).contains(&moved), "one row per tick at most");
        }

        shared.lock().termination_flag = true;
        let deadline = Instant::now() + Duration::from_secs(2);
        while !worker.is_finished() && Instant::now() < deadline {
            let _ = rx.recv_timeout(Duration::from_millis(10));
        }
        assert!(worker.is_finished());
        worker.join();
    }
}
