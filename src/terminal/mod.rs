//! # Terminal
//!
//! Screen layout:
//!
//! ```text
//! row  0 ┌────────────────────────────────────────┐
//!        │ scrollback (VISIBLE_ROWS newest lines, │
//!        │ shifted back by the scroll offset)     │
//! row 22 │                                        │
//! row 23 ├────────────────────────────────────────┤ blank separator
//! row 24 │ >command line                          │
//!        └────────────────────────────────────────┘
//! ```

pub mod command_line;
pub mod scrollback;

pub use command_line::{CommandLine, PROMPT};
pub use scrollback::{Scrollback, COMMAND_MARKER};
