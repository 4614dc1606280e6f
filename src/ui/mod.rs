//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the interaction loop that dispatches input to
//!   [`crate::commands`] and the chat orchestrator.
//! - [`renderer`]: frame layout.
//! - [`markdown`]: transcript rendering and code block copying.
//! - [`theme`]: color and style policy.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
