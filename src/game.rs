//! The controller: top-level wiring and the play/replay/quit state machine.
//!
//! The controller owns the terminal session, spawns the workers, and drains
//! the notice channel: one blocking pop per iteration, re-reading current
//! state for every redraw. It is also the single owner of process teardown:
//! every exit path, signal-triggered or not, funnels through [`Game::run`]
//! returning an [`ExitStatus`].

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::Config;
use crate::error::Error;
use crate::render::{self, TerminalGuard};
use crate::state::{GameState, Shared, Side};
use crate::worker::{
    termination_signaled, AiWorker, BallWorker, InputWorker, Notice, SignalWorker,
};

/// Smallest playable field.
const MIN_COLS: u16 = 24;
/// Smallest playable field.
const MIN_ROWS: u16 = 10;

/// Notice buffer: enough slack that a worker's post-lock send never blocks
/// in normal play.
const NOTICE_BUFFER: usize = 64;

/// Menu loops poll flags at this interval while blocked on the channel.
const MENU_POLL: Duration = Duration::from_millis(50);

/// How the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The user quit from a menu or mid-round.
    Clean,
    /// An OS termination signal ended the game; exit the process with
    /// status 1.
    Signaled,
}

/// The assembled game: terminal session, shared state, notice channel.
pub struct Game {
    config: Config,
    shared: Arc<Shared>,
    notice_tx: Sender<Notice>,
    notice_rx: Receiver<Notice>,
    // Held for Drop: restores the terminal on every exit path.
    _terminal: TerminalGuard,
}

impl Game {
    /// Set up the terminal and the shared state.
    pub fn new(config: Config) -> Result<Self, Error> {
        let (cols, rows) = TerminalGuard::size()?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            return Err(Error::FieldTooSmall {
                cols,
                rows,
                min_cols: MIN_COLS,
                min_rows: MIN_ROWS,
            });
        }
        let terminal = TerminalGuard::new()?;
        let shared = Arc::new(Shared::new(GameState::new(cols, rows)));
        let (notice_tx, notice_rx) = bounded(NOTICE_BUFFER);
        log::info!("field {cols}x{rows}, {config:?}");

        Ok(Self {
            config,
            shared,
            notice_tx,
            notice_rx,
            _terminal: terminal,
        })
    }

    /// Run menus and rounds until the user quits or a signal arrives.
    pub fn run(self) -> Result<ExitStatus, Error> {
        let signal_worker =
            SignalWorker::spawn(self.shared.clone(), self.notice_tx.clone());
        let input_worker = InputWorker::spawn(self.shared.clone(), self.notice_tx.clone());
        let ai_worker = AiWorker::spawn(
            self.shared.clone(),
            self.notice_tx.clone(),
            self.config.ai_tick(),
        );

        self.menu_and_rounds()?;

        // Teardown: raise the cooperative cancel, wake anyone parked on the
        // gate, and keep draining so no worker stays blocked on a full
        // channel while we join it.
        self.shared.lock().termination_flag = true;
        self.shared.pause().release();
        self.drain_while(|| !input_worker.is_finished() || !ai_worker.is_finished());
        input_worker.join();
        ai_worker.join();
        signal_worker.join();

        Ok(if termination_signaled() {
            ExitStatus::Signaled
        } else {
            ExitStatus::Clean
        })
    }

    /// Intro menu, then round / intermission cycles.
    fn menu_and_rounds(&self) -> Result<(), Error> {
        {
            let state = self.shared.lock();
            render::intro(field_cols(&state), field_rows(&state))?;
        }

        loop {
            if !self.wait_for_play() {
                return Ok(());
            }
            self.play_round()?;
            if self.shared.shutdown_requested() {
                return Ok(());
            }
            let state = self.shared.lock();
            render::round_over(field_cols(&state), field_rows(&state), state.winner)?;
        }
    }

    /// Block until the play key or a quit request. Returns false on quit.
    ///
    /// The play key only raises a flag, so this poll is bounded: each channel
    /// timeout re-reads the flags. Stale redraw notices from the free-running
    /// AI are ignored here.
    fn wait_for_play(&self) -> bool {
        loop {
            if self.shared.shutdown_requested() {
                return false;
            }
            if self.shared.lock().play_flag {
                return true;
            }
            match self.notice_rx.recv_timeout(MENU_POLL) {
                Ok(Notice::RoundQuit) => return false,
                Ok(_) | Err(_) => {}
            }
        }
    }

    /// One round: serve, spawn the referee, drain notices until `RoundQuit`.
    fn play_round(&self) -> Result<(), Error> {
        // Stale notices from the intermission would trigger redraws of a
        // field that no longer exists.
        while self.notice_rx.try_recv().is_ok() {}

        {
            let mut state = self.shared.lock();
            state.serve();
            render::repaint(&state)?;
        }

        let ball_worker = BallWorker::spawn(
            self.shared.clone(),
            self.notice_tx.clone(),
            self.config.clone(),
        );

        loop {
            match self.notice_rx.recv() {
                Ok(Notice::KeyboardMoved) => self.redraw_paddle(Side::Player)?,
                Ok(Notice::AiMoved) => self.redraw_paddle(Side::Ai)?,
                Ok(Notice::BallMoved) => self.redraw_ball()?,
                Ok(Notice::RoundQuit) | Err(_) => break,
            }
        }

        // The referee exits on its own after a miss; after a quit it notices
        // the flags on its next tick. Drain so it is never stuck sending.
        self.drain_while(|| !ball_worker.is_finished());
        ball_worker.join();
        {
            let mut state = self.shared.lock();
            state.play_flag = false;
        }
        Ok(())
    }

    /// Erase a paddle at its pre-move row and draw it at the current one,
    /// from state re-read under the lock, never from values cached at
    /// notify time.
    fn redraw_paddle(&self, side: Side) -> Result<(), Error> {
        let state = self.shared.lock();
        render::erase_paddle(&state, side)?;
        render::draw_paddle(&state, side)?;
        Ok(())
    }

    fn redraw_ball(&self) -> Result<(), Error> {
        let state = self.shared.lock();
        render::erase_ball(&state)?;
        render::draw_ball(&state)?;
        render::status(&state)?;
        Ok(())
    }

    /// Drain the notice channel until `running` turns false, so a worker
    /// blocked on a full channel can always make progress toward its exit.
    fn drain_while<F: Fn() -> bool>(&self, running: F) {
        while running() {
            let _ = self.notice_rx.recv_timeout(Duration::from_millis(10));
        }
    }
}

const fn field_cols(state: &GameState) -> u16 {
    truncate_dim(state.paddle_col + 1)
}

const fn field_rows(state: &GameState) -> u16 {
    truncate_dim(state.bottom_row + 1)
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
const fn truncate_dim(dim: i32) -> u16 {
    if dim < 0 {
        0
    } else if dim > u16::MAX as i32 {
        u16::MAX
    } else {
        dim as u16
    }
}
