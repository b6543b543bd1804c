//! Ball physics worker: the authoritative simulation clock.
//!
//! Spawned fresh each round; terminates when the round ends. This worker is
//! the sole writer of `winner` and of round-ending `play_flag` transitions:
//! it is the referee. The step itself is a pure function over `GameState` so
//! collision and leveling stay testable without threads.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::config::Config;
use crate::render;
use crate::state::{GameState, Shared, Winner, FIELD_TOP, PADDLE_WIDTH};

use super::messages::Notice;

/// What one simulated tick did to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// The ball is in flight; nothing terminal happened.
    Advanced,
    /// The player returned the ball. `rally_complete` marks the hit that
    /// filled the rally counter and leveled up.
    PlayerHit {
        /// The hit completed a rally: the level rose, the counter reset.
        rally_complete: bool,
    },
    /// The player missed; the AI takes the round.
    PlayerMissed,
    /// The AI missed; the player takes the round.
    AiMissed,
}

/// Hit acceptance for a paddle column crossing.
///
/// The ball and paddle advance within the same tick, so tolerance is offset
/// by one velocity step: accepted iff
/// `|paddle_row - ball_y + diry| <= PADDLE_WIDTH / 2`.
pub(crate) const fn paddle_intercepts(paddle_row: i32, ball_y: i32, diry: i32) -> bool {
    (paddle_row - ball_y + diry).abs() <= PADDLE_WIDTH / 2
}

/// Advance the simulation by one tick: move the ball, reflect off walls,
/// resolve both paddle columns, score the rally. Caller holds the state lock.
pub(crate) fn step(state: &mut GameState, rally_hits: u32) -> StepOutcome {
    state.ball_y_old = state.ball_y;
    state.ball_x_old = state.ball_x;
    state.ball_y += state.ball_diry;
    state.ball_x += state.ball_dirx;

    // Top/bottom wall: reflect the point across the boundary rather than
    // re-simulating the sub-tick. Exact bounce, no energy loss.
    if state.ball_y < FIELD_TOP || state.ball_y > state.bottom_row {
        state.ball_diry = -state.ball_diry;
        state.ball_y += 2 * state.ball_diry;
    }

    if state.ball_x == state.paddle_col {
        if paddle_intercepts(state.paddle_pos, state.ball_y, state.ball_diry) {
            state.ball_dirx = -state.ball_dirx;
            state.ball_x += 2 * state.ball_dirx;
            state.hit_count += 1;
            if state.hit_count >= rally_hits {
                state.game_level += 1;
                state.hit_count = 0;
                return StepOutcome::PlayerHit {
                    rally_complete: true,
                };
            }
            return StepOutcome::PlayerHit {
                rally_complete: false,
            };
        }
        state.play_flag = false;
        state.winner = Some(Winner::Ai);
        return StepOutcome::PlayerMissed;
    }

    if state.ball_x == state.ai_paddle_col {
        if paddle_intercepts(state.ai_paddle_pos, state.ball_y, state.ball_diry) {
            state.ball_dirx = -state.ball_dirx;
            state.ball_x += 2 * state.ball_dirx;
        } else {
            state.play_flag = false;
            state.winner = Some(Winner::Human);
            return StepOutcome::AiMissed;
        }
    }

    StepOutcome::Advanced
}

/// The per-round physics thread.
pub struct BallWorker {
    handle: Option<JoinHandle<()>>,
}

impl BallWorker {
    /// Spawn the physics thread for one round.
    pub fn spawn(shared: Arc<Shared>, notices: Sender<Notice>, config: Config) -> Self {
        let handle = thread::Builder::new()
            .name("rally-ball".to_string())
            .spawn(move || {
                Self::run_loop(&shared, &notices, &config);
            })
            .expect("failed to spawn ball thread");

        Self {
            handle: Some(handle),
        }
    }

    /// Whether the round has ended from this worker's side.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the physics thread to finish.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(shared: &Arc<Shared>, notices: &Sender<Notice>, config: &Config) {
        {
            let mut state = shared.lock();
            state.game_level = 0;
            state.hit_count = 0;
        }

        loop {
            shared.pause().wait_released();
            if shared.shutdown_requested() {
                log::debug!("ball worker: shutdown requested");
                return;
            }

            let (outcome, level, cols) = {
                let mut state = shared.lock();
                let outcome = step(&mut state, config.rally_hits);
                (outcome, state.game_level, state.paddle_col + 1)
            };

            match outcome {
                StepOutcome::PlayerMissed | StepOutcome::AiMissed => {
                    log::info!("round over: {outcome:?} at level {level}");
                    let _ = notices.send(Notice::RoundQuit);
                    return;
                }
                StepOutcome::PlayerHit { rally_complete } if rally_complete => {
                    if !Self::level_pause(shared, level, cols) {
                        return;
                    }
                    if level > config.max_level {
                        {
                            let mut state = shared.lock();
                            state.play_flag = false;
                            state.winner = Some(Winner::Human);
                        }
                        log::info!("player cleared level {}, game won", config.max_level);
                        let _ = notices.send(Notice::RoundQuit);
                        return;
                    }
                }
                StepOutcome::Advanced | StepOutcome::PlayerHit { .. } => {}
            }

            let _ = notices.send(Notice::BallMoved);
            thread::sleep(config.ball_tick(level));
        }
    }

    /// Level-cleared modal: freeze simulation time, paint the banner, and
    /// block until the input worker releases the gate on space, or until a
    /// quit request releases it for us. Returns false on shutdown.
    ///
    /// The gate engages before the banner paints so a resume pressed mid-paint
    /// cannot be lost.
    fn level_pause(shared: &Arc<Shared>, level: u32, cols: i32) -> bool {
        shared.pause().engage();
        let cols = u16::try_from(cols).unwrap_or(u16::MAX);
        if let Err(e) = render::level_cleared(cols, level) {
            log::warn!("level banner paint failed: {e}");
        }

        shared.pause().wait_released();
        if shared.shutdown_requested() {
            log::debug!("ball worker: quit during level pause");
            return false;
        }

        let state = shared.lock();
        if let Err(e) = render::repaint(&state) {
            log::warn!("post-level repaint failed: {e}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Side;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    const RALLY_HITS: u32 = 8;

    fn state() -> GameState {
        GameState::new(80, 21) // bottom_row = 20, paddle_col = 79, ai col = 0
    }

    #[test]
    fn test_advance_saves_old_coordinates() {
        let mut s = state();
        s.ball_x = 40;
        s.ball_y = 10;
        s.ball_dirx = 1;
        s.ball_diry = 1;
        let outcome = step(&mut s, RALLY_HITS);
        assert_eq!(outcome, StepOutcome::Advanced);
        assert_eq!((s.ball_x_old, s.ball_y_old), (40, 10));
        assert_eq!((s.ball_x, s.ball_y), (41, 11));
    }

    #[test]
    fn test_bottom_wall_reflection_is_exact() {
        // Row 20 is the bottom; a step to 21 must land one unit inside.
        let mut s = state();
        s.ball_x = 40;
        s.ball_y = 20;
        s.ball_diry = 1;
        step(&mut s, RALLY_HITS);
        assert_eq!(s.ball_y, 19);
        assert_eq!(s.ball_diry, -1);
    }

    #[test]
    fn test_top_wall_reflection_is_exact() {
        let mut s = state();
        s.ball_x = 40;
        s.ball_y = FIELD_TOP;
        s.ball_diry = -1;
        step(&mut s, RALLY_HITS);
        assert_eq!(s.ball_y, FIELD_TOP + 1);
        assert_eq!(s.ball_diry, 1);
    }

    #[test]
    fn test_hit_acceptance_is_pure() {
        // Acceptance iff |paddle - ball_y + diry| <= PADDLE_WIDTH / 2.
        assert!(paddle_intercepts(10, 10, 1));
        assert!(paddle_intercepts(10, 9, 1));
        assert!(paddle_intercepts(10, 13, -1));
        assert!(!paddle_intercepts(10, 13, 1));
        assert!(!paddle_intercepts(10, 6, -1));
        // Reproducible given identical inputs
        assert_eq!(paddle_intercepts(7, 5, -1), paddle_intercepts(7, 5, -1));
    }

    #[test]
    fn test_player_hit_flips_direction_and_counts() {
        let mut s = state();
        s.paddle_pos = 10;
        s.ball_x = 78; // one step from the paddle column
        s.ball_y = 9;
        s.ball_dirx = 1;
        s.ball_diry = 1;
        let outcome = step(&mut s, RALLY_HITS);
        assert_eq!(
            outcome,
            StepOutcome::PlayerHit {
                rally_complete: false
            }
        );
        assert_eq!(s.ball_dirx, -1);
        assert_eq!(s.ball_x, 77, "overshoot correction pulls the ball back in");
        assert_eq!(s.hit_count, 1);
        assert_eq!(s.winner, None);
    }

    #[test]
    fn test_player_miss_ends_round_for_ai() {
        let mut s = state();
        s.paddle_pos = 3;
        s.ball_x = 78;
        s.ball_y = 15;
        s.ball_dirx = 1;
        s.ball_diry = 1;
        s.play_flag = true;
        let outcome = step(&mut s, RALLY_HITS);
        assert_eq!(outcome, StepOutcome::PlayerMissed);
        assert_eq!(s.winner, Some(Winner::Ai));
        assert!(!s.play_flag);
    }

    #[test]
    fn test_ai_miss_ends_round_for_player() {
        let mut s = state();
        s.ai_paddle_pos = 15;
        s.ball_x = 1;
        s.ball_y = 5;
        s.ball_dirx = -1;
        s.ball_diry = -1;
        s.play_flag = true;
        let outcome = step(&mut s, RALLY_HITS);
        assert_eq!(outcome, StepOutcome::AiMissed);
        assert_eq!(s.winner, Some(Winner::Human));
        assert!(!s.play_flag);
    }

    #[test]
    fn test_ai_hit_reflects_without_counting() {
        let mut s = state();
        s.ai_paddle_pos = 5;
        s.ball_x = 1;
        s.ball_y = 6;
        s.ball_dirx = -1;
        s.ball_diry = -1;
        let outcome = step(&mut s, RALLY_HITS);
        assert_eq!(outcome, StepOutcome::Advanced);
        assert_eq!(s.ball_dirx, 1);
        assert_eq!(s.hit_count, 0, "only player hits advance the rally");
    }

    #[test]
    fn test_rally_completion_levels_up_and_resets_count() {
        let mut s = state();
        s.paddle_pos = 10;
        s.ball_x = 78;
        s.ball_y = 9;
        s.ball_dirx = 1;
        s.ball_diry = 1;
        s.hit_count = RALLY_HITS - 1;
        let outcome = step(&mut s, RALLY_HITS);
        assert_eq!(
            outcome,
            StepOutcome::PlayerHit {
                rally_complete: true
            }
        );
        assert_eq!(s.game_level, 1);
        assert_eq!(s.hit_count, 0);
    }

    #[test]
    fn test_each_rally_raises_level_by_exactly_one() {
        let mut s = state();
        s.paddle_pos = 10;
        for expected_level in 1..=3 {
            s.ball_x = 78;
            s.ball_y = 9;
            s.ball_dirx = 1;
            s.ball_diry = 1;
            s.hit_count = RALLY_HITS - 1;
            step(&mut s, RALLY_HITS);
            assert_eq!(s.game_level, expected_level);
        }
    }

    #[test]
    fn test_worker_sends_exactly_one_quit_on_miss() {
        let shared = {
            let mut s = state();
            s.paddle_pos = 3;
            s.ball_x = 78;
            s.ball_y = 15;
            s.ball_dirx = 1;
            s.ball_diry = 1;
            s.play_flag = true;
            Arc::new(Shared::new(s))
        };
        let (tx, rx) = bounded(8);

        let worker = BallWorker::spawn(shared.clone(), tx, Config::default());
        let notice = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(notice, Notice::RoundQuit);
        worker.join();

        // The worker dropped its sender; nothing else was queued.
        assert!(rx.try_recv().is_err());
        assert_eq!(shared.lock().winner, Some(Winner::Ai));
    }

    #[test]
    fn test_clearing_top_level_wins_the_round() {
        // One-hit rallies and max_level 0: the first completed rally raises
        // the level past the top and the player wins at the modal's end.
        let config = Config {
            max_level: 0,
            rally_hits: 1,
            ..Config::default()
        };
        let shared = {
            let mut s = state();
            s.paddle_pos = 10;
            s.ball_x = 78;
            s.ball_y = 9;
            s.ball_dirx = 1;
            s.ball_diry = 1;
            s.play_flag = true;
            Arc::new(Shared::new(s))
        };
        let (tx, rx) = bounded(8);

        let worker = BallWorker::spawn(shared.clone(), tx, config);

        // The worker engages the gate for the level modal; simulate the
        // resume keypress once it has.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !shared.pause().is_engaged() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(shared.pause().is_engaged(), "modal must freeze the world");
        shared.pause().release();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Notice::RoundQuit
        );
        worker.join();
        assert!(rx.try_recv().is_err(), "exactly one quit notice");
        let s = shared.lock();
        assert_eq!(s.winner, Some(Winner::Human));
        assert!(!s.play_flag);
        assert_eq!(s.game_level, 1);
    }

    #[test]
    fn test_no_time_advances_while_paused() {
        let shared = Arc::new(Shared::new(state()));
        shared.pause().engage();
        let (tx, rx) = bounded(8);

        let worker = BallWorker::spawn(shared.clone(), tx, Config::default());
        assert!(
            rx.recv_timeout(Duration::from_millis(80)).is_err(),
            "a paused world must not tick"
        );
        let frozen = {
            let s = shared.lock();
            (s.ball_x, s.ball_y, s.paddle_row(Side::Ai))
        };
        let current = {
            let s = shared.lock();
            (s.ball_x, s.ball_y, s.paddle_row(Side::Ai))
        };
        assert_eq!(frozen, current);

        // Releasing the gate lets ticks flow again.
        shared.pause().release();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Notice::BallMoved
        );

        // Quit unblocks and terminates the worker even mid-round.
        shared.lock().exit_flag = true;
        shared.pause().release();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !worker.is_finished() && std::time::Instant::now() < deadline {
            let _ = rx.recv_timeout(Duration::from_millis(10));
        }
        assert!(worker.is_finished());
        worker.join();
    }
}
