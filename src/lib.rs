pub mod api;
pub mod app;
pub mod assets;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod exposure;
pub mod global;
pub mod recall;
pub mod registry;
pub mod service;

pub use error::{BotError, BotResult};
pub use service::BotService;
