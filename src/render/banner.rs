//! Centered text banners: intro menu, level-cleared, round-over.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthStr;

use crate::state::Winner;

const TITLE_COLOR: Color = Color::Cyan;

/// Column that centers `text` on a `cols`-wide grid.
fn centered_col(cols: u16, text: &str) -> u16 {
    let width = u16::try_from(text.width()).unwrap_or(cols);
    (cols.saturating_sub(width)) / 2
}

fn print_centered(out: &mut impl Write, cols: u16, row: u16, text: &str) -> io::Result<()> {
    queue!(out, MoveTo(centered_col(cols, text), row), Print(text))
}

/// Title screen shown before the first serve.
pub fn intro(cols: u16, rows: u16) -> io::Result<()> {
    let mid = rows / 2;
    let mut out = io::stdout().lock();
    queue!(out, Clear(ClearType::All), SetForegroundColor(TITLE_COLOR))?;
    print_centered(&mut out, cols, mid, "RALLY")?;
    print_centered(
        &mut out,
        cols,
        mid + 1,
        "use the arrow keys or the mouse to control the pad",
    )?;
    print_centered(&mut out, cols, mid + 2, "press space to start, q to quit")?;
    queue!(out, ResetColor)?;
    out.flush()
}

/// Level-cleared banner painted on the two reserved top rows while the world
/// is paused.
pub fn level_cleared(cols: u16, level: u32) -> io::Result<()> {
    let cleared = format!("level {level} cleared!");
    let mut out = io::stdout().lock();
    queue!(out, SetForegroundColor(TITLE_COLOR))?;
    print_centered(&mut out, cols, 0, &cleared)?;
    print_centered(&mut out, cols, 1, "press space to continue, q to quit")?;
    queue!(out, ResetColor)?;
    out.flush()
}

/// Round-over screen with the outcome and the replay prompt.
pub fn round_over(cols: u16, rows: u16, winner: Option<Winner>) -> io::Result<()> {
    let outcome = match winner {
        Some(Winner::Human) => "you win!",
        Some(Winner::Ai) => "the machine wins",
        None => "round over",
    };
    let mid = rows / 2;
    let mut out = io::stdout().lock();
    queue!(out, Clear(ClearType::All), SetForegroundColor(TITLE_COLOR))?;
    print_centered(&mut out, cols, mid, outcome)?;
    print_centered(&mut out, cols, mid + 1, "press space to restart, q to quit")?;
    queue!(out, ResetColor)?;
    out.flush()
}
