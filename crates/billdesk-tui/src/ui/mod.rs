//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, the session interstitial and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `views`: per-route content (login form, dashboard, template editor)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
