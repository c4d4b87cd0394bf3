//! The echo bot turn handler

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    adapter::{TurnContext, TurnHandler},
    error::BotResult,
    state::{BotState, StatePropertyAccessor},
};

/// Name of the conversation state property holding the message count
pub const COUNT_PROPERTY: &str = "count";

/// Echoes every message back with the number of messages seen so far in the
/// conversation, and reports any other activity type as detected.
pub struct EchoBot {
    count: StatePropertyAccessor<u64>,
}

impl EchoBot {
    pub fn new(conversation_state: &Arc<BotState>) -> Self {
        Self {
            count: conversation_state.create_property(COUNT_PROPERTY),
        }
    }
}

#[async_trait]
impl TurnHandler for EchoBot {
    async fn on_turn(&self, context: &mut TurnContext) -> BotResult<()> {
        if !context.activity().is_message() {
            let reply = format!("[{} event detected]", context.activity().activity_type);
            context.send_activity(reply).await?;
            return Ok(());
        }

        let count = self.count.get(context).await? + 1;
        self.count.set(context, &count).await?;

        let text = match &context.activity().text {
            Some(text) => text.clone(),
            None => {
                warn!("Message activity without text, echoing an empty string");
                String::new()
            }
        };
        debug!("Conversation count is now {}", count);

        context
            .send_activity(format!(
                "Conversation count is {} and you said \"{}\"",
                count, text
            ))
            .await?;
        Ok(())
    }
}
