//! API route modules.

pub mod bots;
pub mod camera;
pub mod gifs;
