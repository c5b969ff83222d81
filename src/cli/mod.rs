pub mod args;
pub mod config;
pub mod gifs;

pub use args::{Cli, CliCommand, LaunchCliArgs};
pub use config::handle_config_command;
pub use gifs::handle_gifs_command;
