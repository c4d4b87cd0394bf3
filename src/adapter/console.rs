//! Console adapter: stdin lines in, stdout lines out

use async_trait::async_trait;
use chrono::Utc;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::{BotAdapter, Middleware, MiddlewareSet, TurnContext, TurnHandler};
use crate::{
    error::BotResult,
    schema::{Activity, ActivityType, ConversationReference, ResourceResponse},
};

/// Pause used for `delay` activities that carry no usable value
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Adapter that treats each input line as a message from the console user
/// and writes the bot's messages to an output stream, one per line.
pub struct ConsoleAdapter {
    reference: ConversationReference,
    middleware: MiddlewareSet,
    output: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    next_id: AtomicU64,
}

impl ConsoleAdapter {
    /// Create an adapter writing to an arbitrary output stream
    pub fn new(reference: ConversationReference, output: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            reference,
            middleware: MiddlewareSet::new(),
            output: Mutex::new(output),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create an adapter writing to the process stdout
    pub fn stdout(reference: ConversationReference) -> Self {
        Self::new(reference, Box::new(tokio::io::stdout()))
    }

    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.use_middleware(middleware);
        self
    }

    /// Read lines until the input closes, running one turn per line.
    ///
    /// Each turn finishes before the next line is read.
    pub async fn process_activity<R>(self: &Arc<Self>, input: R, handler: &dyn TurnHandler) -> BotResult<()>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let activity = self.incoming_message(line);
            self.run_turn(activity, handler).await?;
        }

        info!("Console input closed");
        Ok(())
    }

    /// Run a `conversationUpdate` turn announcing the user and the bot
    pub async fn announce_conversation(self: &Arc<Self>, handler: &dyn TurnHandler) -> BotResult<()> {
        let mut activity = self.incoming(ActivityType::ConversationUpdate);
        activity.members_added = self
            .reference
            .user
            .iter()
            .chain(self.reference.bot.iter())
            .cloned()
            .collect();
        self.run_turn(activity, handler).await
    }

    async fn run_turn(self: &Arc<Self>, activity: Activity, handler: &dyn TurnHandler) -> BotResult<()> {
        debug!(
            "Processing {} activity {}",
            activity.activity_type,
            activity.id.as_deref().unwrap_or_default()
        );
        let mut context = TurnContext::new(self.clone(), activity);
        self.middleware.run_pipeline(&mut context, handler).await
    }

    fn incoming(&self, activity_type: ActivityType) -> Activity {
        let mut activity = Activity::new(activity_type);
        activity.apply_conversation_reference(&self.reference, true);
        activity.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        activity.timestamp = Some(Utc::now());
        activity
    }

    fn incoming_message(&self, text: String) -> Activity {
        let mut activity = self.incoming(ActivityType::Message);
        activity.text = Some(text);
        activity
    }
}

#[async_trait]
impl BotAdapter for ConsoleAdapter {
    async fn send_activities(&self, activities: &[Activity]) -> BotResult<Vec<ResourceResponse>> {
        let mut output = self.output.lock().await;
        let mut responses = Vec::with_capacity(activities.len());

        for activity in activities {
            match activity.activity_type {
                ActivityType::Message => {
                    if let Some(text) = &activity.text {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                        output.flush().await?;
                    }
                }
                ActivityType::Delay => {
                    let millis = activity
                        .value
                        .as_ref()
                        .and_then(|v| v.as_u64())
                        .unwrap_or(DEFAULT_DELAY_MS);
                    tokio::time::sleep(Duration::from_millis(millis)).await;
                }
                ref other => {
                    debug!("Console adapter ignoring outgoing {} activity", other);
                }
            }

            responses.push(ResourceResponse {
                id: activity
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
            });
        }

        Ok(responses)
    }
}
