use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use crate::{app::App, config::Config};

/// Echobot - type a line, get it echoed back with the conversation count
#[derive(Parser, Debug)]
#[command(
    name = "echobot",
    version,
    about = "Type a line, get it echoed back with the conversation count",
    long_about = r#"Echobot reads lines from the terminal, treats each one as a message in a
single conversation, and echoes it back together with the number of messages
seen so far. State lives in memory only: restarting starts the count over.

Press Ctrl+C or close stdin (Ctrl+D) to exit.

Examples:
  echobot                           # Start chatting
  echobot --config ./echobot.json   # Use a specific config file
  echo hello | echobot              # Echo piped input"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Path to a JSON config file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::init(self.config.as_deref()).await?;
        config.validate()?;
        debug!("Configuration initialized: {:?}", config);

        let app = App::new(config);
        app.run().await
    }
}
