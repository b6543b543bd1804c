//! # Rally
//!
//! A multithreaded terminal Pong.
//!
//! Rally drives a two-paddle ball game from four autonomous worker threads
//! that share one mutex-guarded simulation state and report completed updates
//! to the controller loop over a typed, bounded, blocking channel.
//!
//! ## Core Concepts
//!
//! - **One lock**: the whole simulation state is a single critical region;
//!   update rates are tens of Hz, so contention is rare and reasoning is easy
//! - **Tagged notices**: workers send a `Notice` after releasing the lock;
//!   the controller re-reads current state for every redraw
//! - **Pause gate**: a condvar-backed halt flag freezes simulation time for
//!   the level-transition modal
//! - **Worker model**: isolated threads for input, ball physics, AI pursuit,
//!   and OS signals, each with a `spawn`/`join` handle
//!
//! ## Example
//!
//! ```rust,ignore
//! use rally::{Config, Game};
//!
//! let config = Config::load()?;
//! let status = Game::new(config)?.run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod state;
pub mod worker;

// Re-exports for convenience
pub use config::Config;
pub use error::Error;
pub use game::{ExitStatus, Game};
pub use state::{GameState, Shared, Side, Winner, FIELD_TOP, PADDLE_WIDTH};
pub use worker::{AiWorker, BallWorker, InputWorker, Notice, SignalWorker};
