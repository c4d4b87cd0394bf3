//! Application wiring
//!
//! Builds storage, conversation state, the console adapter and the echo bot,
//! and runs the console conversation until input closes or Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{debug, info};

use crate::{
    adapter::ConsoleAdapter,
    bot::EchoBot,
    config::Config,
    state::{BotState, MemoryStorage, Storage},
};

/// Main application structure
pub struct App {
    config: Config,
    adapter: Arc<ConsoleAdapter>,
    bot: EchoBot,
}

impl App {
    /// Create an application that talks over stdout
    pub fn new(config: Config) -> Self {
        let adapter = ConsoleAdapter::stdout(config.conversation_reference());
        Self::with_adapter(config, adapter)
    }

    /// Create an application writing replies to `output`
    pub fn with_output(config: Config, output: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        let adapter = ConsoleAdapter::new(config.conversation_reference(), output);
        Self::with_adapter(config, adapter)
    }

    fn with_adapter(config: Config, mut adapter: ConsoleAdapter) -> Self {
        debug!("Creating new App instance");

        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let conversation_state = Arc::new(BotState::for_conversation(storage));
        adapter.use_middleware(conversation_state.clone());
        let bot = EchoBot::new(&conversation_state);

        Self {
            config,
            adapter: Arc::new(adapter),
            bot,
        }
    }

    /// Greet the user, then converse over stdin until it closes or Ctrl+C
    pub async fn run(&self) -> Result<()> {
        println!("{}", self.config.greeting);

        let stdin = BufReader::new(tokio::io::stdin());
        tokio::select! {
            result = self.converse(stdin) => result,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Received Ctrl+C, shutting down");
                Ok(())
            }
        }
    }

    /// Run the conversation over an arbitrary line source
    pub async fn converse<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        if self.config.announce_conversation {
            self.adapter.announce_conversation(&self.bot).await?;
        }

        self.adapter.process_activity(input, &self.bot).await?;
        info!("Conversation finished");
        Ok(())
    }
}
