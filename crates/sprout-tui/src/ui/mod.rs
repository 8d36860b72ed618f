//! Terminal UI module using ratatui.
//!
//! - `render`: Frame rendering for each route
//! - `input`: Keyboard event handling
//! - `safe_area`: Insets that keep content clear of the terminal edges
//! - `styles`: Color palette and text styling

pub mod input;
pub mod render;
pub mod safe_area;
pub mod styles;
