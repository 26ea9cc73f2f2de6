//! Controller layer: input parsing, UI error modeling, and dispatch onto the conversation.

pub mod commands;
pub mod events;
pub mod orchestration;
