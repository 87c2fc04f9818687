//! Configuration module
//!
//! Contains the backdrop configuration loaded from JSON.

mod backdrop_config;

pub use backdrop_config::*;
