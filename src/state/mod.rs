//! Shared simulation state.
//!
//! One `GameState` instance exists per process. Every worker mutates it only
//! through [`Shared`], which guards the whole struct behind a single mutex:
//! update rates are tens of Hz and contention is rare, so one coarse critical
//! region beats finer locking for reasoning about who writes what.
//!
//! The pause gate that freezes simulation time lives alongside the state in
//! [`Shared`] so every worker reaches both through one handle.

mod pause;

pub use pause::PauseGate;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Paddle height in rows. Positions track the paddle center, so the usable
/// range for a paddle row is `[PADDLE_WIDTH / 2, bottom_row - PADDLE_WIDTH / 2]`.
pub const PADDLE_WIDTH: i32 = 4;

/// First playable row; row 0 is reserved for the status line.
pub const FIELD_TOP: i32 = 1;

/// Which side a paddle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The human paddle, right edge.
    Player,
    /// The AI paddle, left edge.
    Ai,
}

/// Round outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The player cleared every level or the AI missed.
    Human,
    /// The player missed.
    Ai,
}

/// The single source of truth for the simulation.
///
/// `*_old` fields hold the pre-move value of their counterpart so the
/// controller can erase before drawing; both are updated together under the
/// same lock acquisition.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Human paddle center row.
    pub paddle_pos: i32,
    /// Human paddle center row before the last move.
    pub paddle_pos_old: i32,
    /// AI paddle center row.
    pub ai_paddle_pos: i32,
    /// AI paddle center row before the last move.
    pub ai_paddle_pos_old: i32,
    /// Ball column.
    pub ball_x: i32,
    /// Ball row.
    pub ball_y: i32,
    /// Ball column before the last step.
    pub ball_x_old: i32,
    /// Ball row before the last step.
    pub ball_y_old: i32,
    /// Horizontal velocity, ±1.
    pub ball_dirx: i32,
    /// Vertical velocity, ±1.
    pub ball_diry: i32,
    /// Human paddle column (right edge).
    pub paddle_col: i32,
    /// AI paddle column (left edge).
    pub ai_paddle_col: i32,
    /// Last usable row.
    pub bottom_row: i32,
    /// Current difficulty tier.
    pub game_level: u32,
    /// Consecutive player hits at the current level.
    pub hit_count: u32,
    /// Start/continue a round.
    pub play_flag: bool,
    /// The user asked to quit.
    pub exit_flag: bool,
    /// Cooperative cancellation for the input and AI loops.
    pub termination_flag: bool,
    /// Set exactly once per round, by the ball worker, before `RoundQuit`.
    pub winner: Option<Winner>,
}

impl GameState {
    /// Build a state for a `cols` x `rows` terminal, everything centered.
    pub fn new(cols: u16, rows: u16) -> Self {
        let bottom_row = i32::from(rows) - 1;
        let mid_row = bottom_row / 2;
        let paddle_col = i32::from(cols) - 1;
        let mut state = Self {
            paddle_pos: mid_row,
            paddle_pos_old: mid_row,
            ai_paddle_pos: mid_row,
            ai_paddle_pos_old: mid_row,
            ball_x: paddle_col / 2,
            ball_y: mid_row,
            ball_x_old: paddle_col / 2,
            ball_y_old: mid_row,
            ball_dirx: 1,
            ball_diry: 1,
            paddle_col,
            ai_paddle_col: 0,
            bottom_row,
            game_level: 0,
            hit_count: 0,
            play_flag: false,
            exit_flag: false,
            termination_flag: false,
            winner: None,
        };
        state.paddle_pos = state.clamp_paddle_row(mid_row);
        state.ai_paddle_pos = state.paddle_pos;
        state
    }

    /// Inclusive paddle-center bounds for the current field height.
    pub const fn paddle_bounds(&self) -> (i32, i32) {
        (PADDLE_WIDTH / 2, self.bottom_row - PADDLE_WIDTH / 2)
    }

    /// Clamp a paddle-center row into bounds, pinning to the top bound when
    /// the field is shorter than one paddle.
    pub const fn clamp_paddle_row(&self, row: i32) -> i32 {
        let (lo, hi) = self.paddle_bounds();
        if row > hi {
            // max(hi, lo): a shrunken field must not push the paddle above top
            if hi > lo {
                hi
            } else {
                lo
            }
        } else if row < lo {
            lo
        } else {
            row
        }
    }

    /// Reset ball, paddles and outcome for a new round. Level and hit count
    /// are re-initialized by the ball worker, which owns the simulation clock.
    pub fn serve(&mut self) {
        let mid_row = self.clamp_paddle_row(self.bottom_row / 2);
        self.paddle_pos = mid_row;
        self.paddle_pos_old = mid_row;
        self.ai_paddle_pos = mid_row;
        self.ai_paddle_pos_old = mid_row;
        self.ball_x = self.paddle_col / 2;
        self.ball_y = mid_row;
        self.ball_x_old = self.ball_x;
        self.ball_y_old = self.ball_y;
        self.ball_dirx = 1;
        self.ball_diry = 1;
        self.winner = None;
    }

    /// Move the human paddle by `delta` rows if the result stays in bounds.
    /// Saves the old row either way; the erase path reads it regardless of
    /// whether the move was pinned.
    pub fn nudge_paddle(&mut self, delta: i32) {
        let (lo, hi) = self.paddle_bounds();
        self.paddle_pos_old = self.paddle_pos;
        let target = self.paddle_pos + delta;
        if target >= lo && target <= hi {
            self.paddle_pos = target;
        }
    }

    /// Set the human paddle row from a pointer event, clamped into bounds.
    pub fn set_paddle_row(&mut self, row: i32) {
        self.paddle_pos_old = self.paddle_pos;
        self.paddle_pos = self.clamp_paddle_row(row);
    }

    /// Step the AI paddle one row toward the ball, if the result stays in
    /// bounds. Proportional pursuit with unit speed keeps the AI beatable.
    pub fn pursue_ball(&mut self) {
        let diff = self.ball_y - self.ai_paddle_pos;
        let target = self.ai_paddle_pos + diff.signum();
        let (lo, hi) = self.paddle_bounds();
        self.ai_paddle_pos_old = self.ai_paddle_pos;
        if target >= lo && target <= hi {
            self.ai_paddle_pos = target;
        }
    }

    /// Apply a terminal resize: new field geometry, then clamp everything
    /// back inside it.
    ///
    /// Clamp policy: paddle centers pin to `max(bottom - width/2, width/2)`;
    /// a ball row below the new bottom clamps to it; a ball column beyond the
    /// new width resets the ball row to mid-screen (defensive fallback, not a
    /// physical reflection).
    pub fn apply_resize(&mut self, cols: u16, rows: u16) {
        self.bottom_row = i32::from(rows) - 1;
        self.paddle_col = i32::from(cols) - 1;

        self.paddle_pos = self.clamp_paddle_row(self.paddle_pos);
        self.ai_paddle_pos = self.clamp_paddle_row(self.ai_paddle_pos);
        if self.ball_y > self.bottom_row {
            self.ball_y = self.bottom_row;
        }
        if self.ball_x > self.paddle_col {
            self.ball_y = self.bottom_row / 2;
        }
    }

    /// Paddle center row for a side.
    pub const fn paddle_row(&self, side: Side) -> i32 {
        match side {
            Side::Player => self.paddle_pos,
            Side::Ai => self.ai_paddle_pos,
        }
    }

    /// Pre-move paddle center row for a side.
    pub const fn paddle_row_old(&self, side: Side) -> i32 {
        match side {
            Side::Player => self.paddle_pos_old,
            Side::Ai => self.ai_paddle_pos_old,
        }
    }

    /// Fixed column for a side's paddle.
    pub const fn side_col(&self, side: Side) -> i32 {
        match side {
            Side::Player => self.paddle_col,
            Side::Ai => self.ai_paddle_col,
        }
    }
}

/// Lock-then-view access to the simulation state, plus the pause gate.
///
/// Lock hold times are O(1) field updates; nothing blocks on I/O while
/// holding the guard, and channel sends happen only after it drops.
#[derive(Debug)]
pub struct Shared {
    state: Mutex<GameState>,
    pause: PauseGate,
}

impl Shared {
    /// Wrap a freshly built state.
    pub fn new(state: GameState) -> Self {
        Self {
            state: Mutex::new(state),
            pause: PauseGate::new(),
        }
    }

    /// Acquire the state lock. A worker that panicked mid-update must not
    /// wedge the controller, so poisoning is recovered, not propagated.
    pub fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cooperative pause gate shared by the time-advancing workers.
    pub const fn pause(&self) -> &PauseGate {
        &self.pause
    }

    /// True once either shutdown flag is raised.
    pub fn shutdown_requested(&self) -> bool {
        let state = self.lock();
        state.exit_flag || state.termination_flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(80, 21) // bottom_row = 20
    }

    #[test]
    fn test_new_geometry() {
        let state = state();
        assert_eq!(state.bottom_row, 20);
        assert_eq!(state.paddle_col, 79);
        assert_eq!(state.ai_paddle_col, 0);
        assert_eq!(state.paddle_bounds(), (2, 18));
    }

    #[test]
    fn test_nudge_respects_bounds() {
        let mut state = state();
        state.paddle_pos = 2;
        state.nudge_paddle(-1);
        assert_eq!(state.paddle_pos, 2, "must not go above the top bound");
        assert_eq!(state.paddle_pos_old, 2, "old row saved even when pinned");

        state.paddle_pos = 18;
        state.nudge_paddle(1);
        assert_eq!(state.paddle_pos, 18, "must not go below the bottom bound");

        state.paddle_pos = 10;
        state.nudge_paddle(1);
        assert_eq!(state.paddle_pos, 11);
        assert_eq!(state.paddle_pos_old, 10);
    }

    #[test]
    fn test_pointer_row_is_clamped() {
        let mut state = state();
        state.set_paddle_row(500);
        assert_eq!(state.paddle_pos, 18);
        state.set_paddle_row(-3);
        assert_eq!(state.paddle_pos, 2);
        state.set_paddle_row(7);
        assert_eq!(state.paddle_pos, 7);
        assert_eq!(state.paddle_pos_old, 2);
    }

    #[test]
    fn test_pursuit_steps_one_row_toward_ball() {
        let mut state = state();
        state.ai_paddle_pos = 10;
        state.ball_y = 14;
        state.pursue_ball();
        assert_eq!(state.ai_paddle_pos, 11);
        assert_eq!(state.ai_paddle_pos_old, 10);

        state.ball_y = 5;
        state.pursue_ball();
        assert_eq!(state.ai_paddle_pos, 10);

        state.ball_y = 10;
        state.pursue_ball();
        assert_eq!(state.ai_paddle_pos, 10, "aligned paddle holds still");
    }

    #[test]
    fn test_pursuit_respects_bounds() {
        let mut state = state();
        state.ai_paddle_pos = 18;
        state.ball_y = 20;
        state.pursue_ball();
        assert_eq!(state.ai_paddle_pos, 18);
    }

    #[test]
    fn test_resize_shrink_clamps_paddles() {
        let mut state = state();
        state.paddle_pos = 18;
        state.ai_paddle_pos = 16;
        state.apply_resize(80, 13); // bottom_row = 12, bounds (2, 10)
        assert_eq!(state.paddle_pos, 10);
        assert_eq!(state.ai_paddle_pos, 10);
    }

    #[test]
    fn test_resize_tiny_field_pins_to_top_bound() {
        let mut state = state();
        state.paddle_pos = 10;
        state.apply_resize(80, 4); // bottom_row = 3, hi = 1 < lo = 2
        assert_eq!(state.paddle_pos, 2);
    }

    #[test]
    fn test_resize_clamps_ball_row() {
        let mut state = state();
        state.ball_y = 19;
        state.apply_resize(80, 13);
        assert_eq!(state.ball_y, 12);
    }

    #[test]
    fn test_resize_out_of_width_ball_recenters_row() {
        let mut state = state();
        state.ball_x = 70;
        state.ball_y = 3;
        state.apply_resize(40, 21); // paddle_col = 39 < ball_x
        assert_eq!(state.ball_y, 10);
    }

    #[test]
    fn test_serve_resets_outcome_and_ball() {
        let mut state = state();
        state.winner = Some(Winner::Ai);
        state.ball_x = 3;
        state.ball_diry = -1;
        state.serve();
        assert_eq!(state.winner, None);
        assert_eq!(state.ball_x, 39);
        assert_eq!(state.ball_y, 10);
        assert_eq!(state.ball_diry, 1);
    }

    #[test]
    fn test_shared_lock_roundtrip() {
        let shared = Shared::new(state());
        shared.lock().paddle_pos = 7;
        assert_eq!(shared.lock().paddle_pos, 7);
        assert!(!shared.shutdown_requested());
        shared.lock().exit_flag = true;
        assert!(shared.shutdown_requested());
    }
}
