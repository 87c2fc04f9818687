//! Utility module
//!
//! Pixel and color helpers shared by the player and the viewer.

pub mod color;
