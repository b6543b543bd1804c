//! Worker threads: the autonomous halves of the game.
//!
//! Four workers run on their own schedules, mutate the shared state under its
//! single lock, and notify the controller over one bounded channel:
//!
//! ```text
//! ┌────────────────┐
//! │ Signal Listener│──── resize / shutdown ────┐
//! └────────────────┘                           │
//! ┌────────────────┐    KeyboardMoved      ┌───▼──────────┐
//! │  Input Worker  │ ────────────────────▶ │              │
//! └────────────────┘                       │  Controller  │
//! ┌────────────────┐    BallMoved/Quit     │    Loop      │
//! │  Ball Physics  │ ────────────────────▶ │  (blocking   │
//! └────────────────┘                       │   recv)      │
//! ┌────────────────┐    AiMoved            │              │
//! │   AI Worker    │ ────────────────────▶ │              │
//! └────────────────┘                       └──────────────┘
//! ```
//!
//! Every send happens after the sender has released the state lock, so
//! channel backpressure can never participate in a lock-ordering deadlock.

mod ai;
mod ball;
mod input;
mod messages;
mod signals;

pub use ai::AiWorker;
pub use ball::BallWorker;
pub use input::InputWorker;
pub use messages::Notice;
pub use signals::{termination_signaled, SignalWorker};
