use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipstack")]
#[command(about = "Clipboard history for text and screenshots")]
#[command(version)]
pub struct Cli {
    /// History file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output, repeat for more (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record clipboard changes and new screenshots until interrupted
    Watch(WatchArgs),

    /// Print the history, most recent first
    List(ListArgs),

    /// Put a history entry back on the clipboard
    Copy(CopyArgs),

    /// Delete the whole history
    Clear,

    /// Print or set the theme color
    Theme(ThemeArgs),
}

#[derive(Parser)]
pub struct WatchArgs {
    /// Clipboard poll interval, e.g. "1s" or "250ms"
    #[arg(long)]
    pub interval: Option<String>,

    /// Directory to watch for new screenshots
    #[arg(long)]
    pub watch_dir: Option<PathBuf>,

    /// Don't watch for screenshots, only poll the clipboard
    #[arg(long, default_value_t = false)]
    pub no_watch: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Only show entries containing this text ("image" lists screenshots)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Show at most this many entries
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct CopyArgs {
    /// Position in the history as shown by `list`, 0 is the most recent
    pub index: usize,
}

#[derive(Parser)]
pub struct ThemeArgs {
    /// New theme color, e.g. "#1e1e2e"; prints the current one when omitted
    pub color: Option<String>,
}
