//! Render module
//!
//! Surfaces the video layer composites onto.

mod surface;

pub use surface::RenderTarget;
