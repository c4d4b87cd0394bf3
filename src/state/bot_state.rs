//! Turn-scoped state backed by a `Storage`

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::{StatePropertyAccessor, Storage, StoreItem, StoreItems};
use crate::{
    adapter::{Middleware, Next, TurnContext},
    error::{BotError, BotResult},
    schema::Activity,
};

/// Property bag cached in the turn context, plus the copy that was loaded
#[derive(Debug, Clone, Default)]
pub struct CachedBotState {
    state: Map<String, Value>,
    loaded: Map<String, Value>,
}

impl CachedBotState {
    fn new(state: Map<String, Value>) -> Self {
        Self {
            loaded: state.clone(),
            state,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.state != self.loaded
    }
}

type StorageKeyFn = fn(&Activity) -> BotResult<String>;

/// State scoped by a key derived from the incoming activity.
///
/// `load` reads the bag into the turn context, handlers read and write it
/// there, and `save_changes` writes it back to storage. Registered as
/// middleware, it does both around every turn.
pub struct BotState {
    storage: Arc<dyn Storage>,
    service_key: &'static str,
    key_fn: StorageKeyFn,
}

impl BotState {
    /// State shared by everyone in a conversation, keyed
    /// `{channel_id}/conversations/{conversation_id}`
    pub fn for_conversation(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            service_key: "ConversationState",
            key_fn: conversation_key,
        }
    }

    /// State following a user across conversations, keyed
    /// `{channel_id}/users/{user_id}`
    pub fn for_user(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            service_key: "UserState",
            key_fn: user_key,
        }
    }

    pub fn storage_key(&self, context: &TurnContext) -> BotResult<String> {
        (self.key_fn)(context.activity())
    }

    /// Typed accessor for a single named property in this bag
    pub fn create_property<T>(self: &Arc<Self>, name: impl Into<String>) -> StatePropertyAccessor<T> {
        StatePropertyAccessor::new(self.clone(), name)
    }

    /// Read the bag into the turn context unless it is already there
    pub async fn load(&self, context: &mut TurnContext, force: bool) -> BotResult<()> {
        if !force && context.cached_state(self.service_key).is_some() {
            return Ok(());
        }

        let key = self.storage_key(context)?;
        let mut items = self.storage.read(std::slice::from_ref(&key)).await?;
        let state = items.remove(&key).map(|item| item.value).unwrap_or_default();

        debug!("Loaded {} for {} ({} properties)", self.service_key, key, state.len());
        context.set_cached_state(self.service_key, CachedBotState::new(state));
        Ok(())
    }

    /// Write the cached bag to storage if it changed, or always when `force` is set
    pub async fn save_changes(&self, context: &mut TurnContext, force: bool) -> BotResult<()> {
        let Some(cached) = context.cached_state(self.service_key) else {
            return Ok(());
        };
        if !force && !cached.is_changed() {
            return Ok(());
        }

        let key = self.storage_key(context)?;
        let state = cached.state.clone();
        let changes: StoreItems = [(key.clone(), StoreItem::overwrite(state.clone()))].into();
        self.storage.write(changes).await?;

        if let Some(cached) = context.cached_state_mut(self.service_key) {
            cached.loaded = state;
        }
        debug!("Saved {} for {}", self.service_key, key);
        Ok(())
    }

    /// Empty the cached bag; the next save writes the empty bag
    pub fn clear(&self, context: &mut TurnContext) {
        match context.cached_state_mut(self.service_key) {
            Some(cached) => cached.state.clear(),
            None => context.set_cached_state(self.service_key, CachedBotState::default()),
        }
    }

    /// Drop the cached bag and remove it from storage
    pub async fn delete(&self, context: &mut TurnContext) -> BotResult<()> {
        context.remove_cached_state(self.service_key);
        let key = self.storage_key(context)?;
        self.storage.delete(&[key]).await
    }

    /// The bag loaded for this turn, if `load` has run
    pub fn get<'a>(&self, context: &'a TurnContext) -> Option<&'a Map<String, Value>> {
        context.cached_state(self.service_key).map(|cached| &cached.state)
    }

    pub fn get_mut<'a>(&self, context: &'a mut TurnContext) -> Option<&'a mut Map<String, Value>> {
        context
            .cached_state_mut(self.service_key)
            .map(|cached| &mut cached.state)
    }

    pub(crate) async fn get_property_value(
        &self,
        context: &mut TurnContext,
        name: &str,
    ) -> BotResult<Option<Value>> {
        self.load(context, false).await?;
        Ok(self.loaded_bag(context)?.get(name).cloned())
    }

    pub(crate) async fn set_property_value(
        &self,
        context: &mut TurnContext,
        name: &str,
        value: Value,
    ) -> BotResult<()> {
        self.load(context, false).await?;
        self.loaded_bag(context)?.insert(name.to_string(), value);
        Ok(())
    }

    pub(crate) async fn delete_property_value(
        &self,
        context: &mut TurnContext,
        name: &str,
    ) -> BotResult<()> {
        self.load(context, false).await?;
        self.loaded_bag(context)?.remove(name);
        Ok(())
    }

    fn loaded_bag<'a>(&self, context: &'a mut TurnContext) -> BotResult<&'a mut Map<String, Value>> {
        let service_key = self.service_key;
        self.get_mut(context)
            .ok_or_else(|| BotError::Storage(format!("{} is not loaded", service_key)))
    }
}

#[async_trait]
impl Middleware for BotState {
    async fn on_turn(&self, context: &mut TurnContext, next: Next<'_>) -> BotResult<()> {
        self.load(context, true).await?;
        next.run(context).await?;
        self.save_changes(context, true).await
    }
}

fn conversation_key(activity: &Activity) -> BotResult<String> {
    let channel_id = channel_id(activity)?;
    let conversation_id = activity
        .conversation
        .as_ref()
        .map(|c| c.id.as_str())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BotError::MissingIdentity("activity.conversation.id".to_string()))?;
    Ok(format!("{}/conversations/{}", channel_id, conversation_id))
}

fn user_key(activity: &Activity) -> BotResult<String> {
    let channel_id = channel_id(activity)?;
    let user_id = activity
        .from
        .as_ref()
        .map(|f| f.id.as_str())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BotError::MissingIdentity("activity.from.id".to_string()))?;
    Ok(format!("{}/users/{}", channel_id, user_id))
}

fn channel_id(activity: &Activity) -> BotResult<&str> {
    activity
        .channel_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BotError::MissingIdentity("activity.channel_id".to_string()))
}
