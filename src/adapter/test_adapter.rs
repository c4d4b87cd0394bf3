//! In-process adapter that records what the bot sends

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::Mutex;

use super::{BotAdapter, Middleware, MiddlewareSet, TurnContext, TurnHandler};
use crate::{
    error::BotResult,
    schema::{
        Activity, ActivityType, ChannelAccount, ConversationAccount, ConversationReference,
        ResourceResponse,
    },
};

pub struct TestAdapter {
    reference: ConversationReference,
    middleware: MiddlewareSet,
    sent: Mutex<Vec<Activity>>,
    next_id: AtomicU64,
}

impl TestAdapter {
    pub fn new() -> Self {
        Self::with_conversation("convo-1")
    }

    pub fn with_conversation(conversation_id: &str) -> Self {
        Self {
            reference: ConversationReference {
                activity_id: None,
                user: Some(ChannelAccount::new("user", "User")),
                bot: Some(ChannelAccount::new("bot", "Bot")),
                conversation: Some(ConversationAccount::new(conversation_id)),
                channel_id: Some("test".to_string()),
            },
            middleware: MiddlewareSet::new(),
            sent: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.use_middleware(middleware);
        self
    }

    /// Build an incoming activity of any type addressed from the test user
    pub fn make_activity(&self, activity_type: ActivityType) -> Activity {
        let mut activity = Activity::new(activity_type);
        activity.apply_conversation_reference(&self.reference, true);
        activity.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        activity.timestamp = Some(Utc::now());
        activity
    }

    pub fn make_message(&self, text: &str) -> Activity {
        let mut activity = self.make_activity(ActivityType::Message);
        activity.text = Some(text.to_string());
        activity
    }

    /// Run one turn through the middleware and handler
    pub async fn process(self: &Arc<Self>, activity: Activity, handler: &dyn TurnHandler) -> BotResult<()> {
        let mut context = TurnContext::new(self.clone(), activity);
        self.middleware.run_pipeline(&mut context, handler).await
    }

    pub async fn send_text(self: &Arc<Self>, text: &str, handler: &dyn TurnHandler) -> BotResult<()> {
        let activity = self.make_message(text);
        self.process(activity, handler).await
    }

    pub async fn sent_activities(&self) -> Vec<Activity> {
        self.sent.lock().await.clone()
    }

    /// Drain the text of every message sent so far
    pub async fn take_replies(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .drain(..)
            .filter(|a| a.is_message())
            .map(|a| a.text.unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl BotAdapter for TestAdapter {
    async fn send_activities(&self, activities: &[Activity]) -> BotResult<Vec<ResourceResponse>> {
        let mut sent = self.sent.lock().await;
        let mut responses = Vec::with_capacity(activities.len());
        for activity in activities {
            sent.push(activity.clone());
            responses.push(ResourceResponse {
                id: format!("reply-{}", sent.len()),
            });
        }
        Ok(responses)
    }
}
