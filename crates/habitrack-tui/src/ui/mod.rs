//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, bars and overlays
//! - `forms`: Login and registration screens
//! - `input`: Keyboard event handling
//! - `styles`: Color palette and text styling
//! - `tabs`: Content of the signed-in tabs

pub mod forms;
pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
