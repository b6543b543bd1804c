//! Startup errors.
//!
//! Everything that can fail does so before the first serve: terminal setup
//! and configuration load. Mid-game conditions (missed paddles, resizes,
//! empty polls) are game states, not errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to `main` during startup and teardown.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw mode, alternate screen, or terminal size query failed.
    #[error("terminal setup failed: {0}")]
    Terminal(#[from] io::Error),

    /// A config file was present but unreadable or malformed.
    #[error("could not load config {}: {reason}", path.display())]
    Config {
        /// Path of the offending file.
        path: PathBuf,
        /// Parse or read failure description.
        reason: String,
    },

    /// The terminal is too small to hold a playable field.
    #[error("terminal {cols}x{rows} is too small (minimum {min_cols}x{min_rows})")]
    FieldTooSmall {
        /// Reported column count.
        cols: u16,
        /// Reported row count.
        rows: u16,
        /// Minimum playable columns.
        min_cols: u16,
        /// Minimum playable rows.
        min_rows: u16,
    },
}
