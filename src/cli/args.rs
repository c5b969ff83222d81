use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "botcam")]
#[command(about = "Send meeting bots whose camera shows an animated GIF", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (default: ~/.config/botcam/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the web service (default)
    Serve,
    /// Expose a single GIF and send one bot into a meeting
    Launch(LaunchCliArgs),
    /// List GIFs in the asset directory
    Gifs,
    /// Print the effective configuration with secrets masked
    Config,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct LaunchCliArgs {
    /// GIF file to use as the bot camera
    pub gif: PathBuf,
    /// Zoom, Teams, Google Meet, or Webex meeting link
    #[arg(short, long)]
    pub meeting_url: String,
    /// Display name of the bot (default: from config)
    #[arg(short = 'n', long)]
    pub bot_name: Option<String>,
}
