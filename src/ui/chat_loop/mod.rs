//! Main chat event loop.
//!
//! The loop owns the [`App`] outright. Terminal input arrives from a polling
//! task; transport replies and file reads come back from spawned tasks over
//! a second channel and are applied on the loop, so the app is never shared.

mod event_loop;
mod lifecycle;

pub use event_loop::{handle_key, handle_loop_event, handle_paste, LoopEvent};

use std::error::Error;

use crate::core::app::App;

use self::lifecycle::{restore_terminal, setup_terminal};

/// Run the interactive session until the user quits.
pub async fn run_chat(mut app: App) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    let result = event_loop::run(&mut terminal, &mut app).await;
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}
