//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`layout`]: Chat bubbles wrapped into terminal rows
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Theming and colors

pub mod layout;
pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use overlays::help_popup_rect;
pub use render::{ScreenAreas, render, screen_areas, transcript_area};
pub use status::status_text;

/// Tallest the input box grows before it scrolls.
pub const MAX_INPUT_ROWS: usize = 6;

#[cfg(test)]
mod tests;
