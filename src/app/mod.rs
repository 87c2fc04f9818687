//! Application module
//!
//! Contains the backdrop session, its state machine and the two drivers
//! (egui viewer and headless).

mod backdrop_app;
pub mod headless;
pub mod session;
pub mod state;

pub use backdrop_app::BackdropApp;
pub use session::BackdropSession;
pub use state::*;
