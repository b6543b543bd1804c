//! Rally entry point: logger, config, game, exit status.

use std::process::ExitCode;

use rally::{Config, Error, ExitStatus, Game};

fn run() -> Result<ExitStatus, Error> {
    let config = Config::load()?;
    Game::new(config)?.run()
}

fn main() -> ExitCode {
    // Logs go to stderr; redirect it to a file when playing, the screen
    // belongs to the game.
    env_logger::init();

    match run() {
        Ok(ExitStatus::Clean) => ExitCode::SUCCESS,
        // Signal-triggered termination exits non-zero.
        Ok(ExitStatus::Signaled) => ExitCode::from(1),
        Err(e) => {
            log::error!("{e}");
            eprintln!("rally: {e}");
            ExitCode::from(2)
        }
    }
}
