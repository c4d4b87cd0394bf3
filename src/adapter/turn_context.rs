//! Per-turn context handed to middleware and handlers

use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use super::BotAdapter;
use crate::{
    error::BotResult,
    schema::{Activity, ActivityType, ResourceResponse},
    state::CachedBotState,
};

/// Everything a single turn needs: the incoming activity, a way to reply,
/// and the state loaded for this turn.
pub struct TurnContext {
    adapter: Arc<dyn BotAdapter>,
    activity: Activity,
    responded: bool,
    state_cache: HashMap<&'static str, CachedBotState>,
}

impl TurnContext {
    pub fn new(adapter: Arc<dyn BotAdapter>, activity: Activity) -> Self {
        Self {
            adapter,
            activity,
            responded: false,
            state_cache: HashMap::new(),
        }
    }

    /// The incoming activity for this turn
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn adapter(&self) -> &Arc<dyn BotAdapter> {
        &self.adapter
    }

    /// Whether anything other than a trace has been sent this turn
    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Reply with a plain text message
    pub async fn send_activity(&mut self, text: impl Into<String>) -> BotResult<ResourceResponse> {
        let mut responses = self.send_activities(vec![Activity::message(text)]).await?;
        Ok(responses.pop().unwrap_or(ResourceResponse { id: String::new() }))
    }

    /// Address each activity as a reply to the incoming one and send them in order
    pub async fn send_activities(
        &mut self,
        mut activities: Vec<Activity>,
    ) -> BotResult<Vec<ResourceResponse>> {
        let reference = self.activity.conversation_reference();
        for activity in activities.iter_mut() {
            activity.apply_conversation_reference(&reference, false);
        }

        debug!("Sending {} activities", activities.len());
        let responses = self.adapter.send_activities(&activities).await?;

        if activities
            .iter()
            .any(|a| a.activity_type != ActivityType::Trace)
        {
            self.responded = true;
        }

        Ok(responses)
    }

    pub(crate) fn cached_state(&self, service_key: &str) -> Option<&CachedBotState> {
        self.state_cache.get(service_key)
    }

    pub(crate) fn cached_state_mut(&mut self, service_key: &str) -> Option<&mut CachedBotState> {
        self.state_cache.get_mut(service_key)
    }

    pub(crate) fn set_cached_state(&mut self, service_key: &'static str, state: CachedBotState) {
        self.state_cache.insert(service_key, state);
    }

    pub(crate) fn remove_cached_state(&mut self, service_key: &str) -> Option<CachedBotState> {
        self.state_cache.remove(service_key)
    }
}
