//! Render primitives: idempotent point-set operations on the terminal grid.
//!
//! Every operation locks stdout, queues its cells, and flushes once, so calls
//! are safe from any thread: the signal listener repaints on resize, the
//! ball worker paints the level banner, and the controller does everything
//! else. No operation reads back from the terminal.

mod banner;

pub use banner::{intro, level_cleared, round_over};

use std::io::{self, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::state::{GameState, Side, PADDLE_WIDTH};

/// Background for the human paddle.
const PLAYER_COLOR: Color = Color::Blue;
/// Background for the AI paddle.
const AI_COLOR: Color = Color::Red;
/// The ball glyph color.
const BALL_COLOR: Color = Color::Yellow;
/// Status line color.
const STATUS_COLOR: Color = Color::DarkGrey;

/// The ball glyph.
const BALL_GLYPH: char = 'o';

/// Paddles are two columns wide; the second column sits field-inward.
const fn inner_col(side: Side, col: i32) -> i32 {
    match side {
        Side::Player => col - 1,
        Side::Ai => col + 1,
    }
}

/// Queue one cell if it lies on the grid. Out-of-range coordinates are
/// silently skipped: erase targets can be stale after a resize.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn put(out: &mut impl Write, x: i32, y: i32, glyph: char) -> io::Result<()> {
    if x < 0 || y < 0 || x > i32::from(u16::MAX) || y > i32::from(u16::MAX) {
        return Ok(());
    }
    queue!(out, MoveTo(x as u16, y as u16), Print(glyph))
}

fn paint_paddle(state: &GameState, side: Side, row: i32, color: Option<Color>) -> io::Result<()> {
    let col = state.side_col(side);
    let base = row - PADDLE_WIDTH / 2;
    let mut out = io::stdout().lock();
    if let Some(color) = color {
        queue!(out, SetBackgroundColor(color))?;
    }
    for i in 0..PADDLE_WIDTH {
        put(&mut out, col, base + i, ' ')?;
        put(&mut out, inner_col(side, col), base + i, ' ')?;
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// Draw a side's paddle at its current row.
pub fn draw_paddle(state: &GameState, side: Side) -> io::Result<()> {
    let color = match side {
        Side::Player => PLAYER_COLOR,
        Side::Ai => AI_COLOR,
    };
    paint_paddle(state, side, state.paddle_row(side), Some(color))
}

/// Blank a side's paddle at its pre-move row.
pub fn erase_paddle(state: &GameState, side: Side) -> io::Result<()> {
    paint_paddle(state, side, state.paddle_row_old(side), None)
}

/// Draw the ball at its current cell.
pub fn draw_ball(state: &GameState) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(out, SetForegroundColor(BALL_COLOR))?;
    put(&mut out, state.ball_x, state.ball_y, BALL_GLYPH)?;
    queue!(out, ResetColor)?;
    out.flush()
}

/// Blank the ball at its previous cell.
pub fn erase_ball(state: &GameState) -> io::Result<()> {
    let mut out = io::stdout().lock();
    put(&mut out, state.ball_x_old, state.ball_y_old, ' ')?;
    out.flush()
}

/// Level and rally progress on the reserved top row.
pub fn status(state: &GameState) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(
        out,
        MoveTo(0, 0),
        SetForegroundColor(STATUS_COLOR),
        Print(format!(
            " level {}  rally {}",
            state.game_level, state.hit_count
        )),
        ResetColor
    )?;
    out.flush()
}

/// Clear the screen and repaint the whole field from current state: status
/// line, both paddles, ball.
pub fn repaint(state: &GameState) -> io::Result<()> {
    {
        let mut out = io::stdout().lock();
        queue!(out, Clear(ClearType::All))?;
        out.flush()?;
    }
    status(state)?;
    draw_paddle(state, Side::Ai)?;
    draw_paddle(state, Side::Player)?;
    draw_ball(state)
}

/// RAII ownership of the terminal session.
///
/// Entering raw mode, the alternate screen, mouse capture and cursor hiding
/// happens once at startup; `Drop` restores all of it on every exit path the
/// controller owns, so a quit, a win, or a signal all leave the terminal
/// usable.
#[derive(Debug)]
pub struct TerminalGuard(());

impl TerminalGuard {
    /// Enter raw mode, the alternate screen, and mouse capture.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(Self(()))
    }

    /// Current terminal size as `(cols, rows)`.
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(out, cursor::Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
