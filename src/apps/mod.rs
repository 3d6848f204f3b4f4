//! # Applications Module
//!
//! - `terminal_app`: the interactive shell that owns the screen in
//!   Terminal mode
//! - `snake`: the snake game, a [`VisualApp`](crate::app::VisualApp)

pub mod snake;
pub mod terminal_app;
