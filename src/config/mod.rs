use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::schema::{ChannelAccount, ConversationAccount, ConversationReference};

pub const DEFAULT_GREETING: &str = "Hi... I'm an echobot. Whatever you say I'll echo back.";

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Line printed before the conversation starts
    pub greeting: String,

    /// Channel id stamped on console activities
    pub channel_id: String,

    /// Console user identity
    pub user_id: String,
    pub user_name: String,

    /// Bot identity
    pub bot_id: String,
    pub bot_name: String,

    /// Conversation id; a random one is generated when unset
    pub conversation_id: Option<String>,

    /// Run a conversationUpdate turn before reading input
    pub announce_conversation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            channel_id: "console".to_string(),
            user_id: "user".to_string(),
            user_name: "User".to_string(),
            bot_id: "bot".to_string(),
            bot_name: "Bot".to_string(),
            conversation_id: None,
            announce_conversation: false,
        }
    }
}

impl Config {
    /// Initialize configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise the first of the default
    /// locations that exists is used, falling back to built-in defaults.
    pub async fn init(path: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match path {
            Some(path) => Self::load_from_file(path).await?,
            None => match Self::default_paths().into_iter().find(|p| p.exists()) {
                Some(path) => Self::load_from_file(&path).await?,
                None => Self::default(),
            },
        };

        config.apply_env(|name| std::env::var(name).ok());

        if config.conversation_id.is_none() {
            config.conversation_id = Some(Uuid::new_v4().to_string());
        }

        Ok(config)
    }

    /// Configuration file locations, in priority order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("./.echobot.json"),
            PathBuf::from("./echobot.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("echobot").join("echobot.json"));
        }

        paths
    }

    pub async fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Override fields from `ECHOBOT_*` variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(greeting) = lookup("ECHOBOT_GREETING") {
            self.greeting = greeting;
        }
        if let Some(channel_id) = lookup("ECHOBOT_CHANNEL_ID") {
            self.channel_id = channel_id;
        }
        if let Some(user_id) = lookup("ECHOBOT_USER_ID") {
            self.user_id = user_id;
        }
        if let Some(user_name) = lookup("ECHOBOT_USER_NAME") {
            self.user_name = user_name;
        }
        if let Some(bot_id) = lookup("ECHOBOT_BOT_ID") {
            self.bot_id = bot_id;
        }
        if let Some(bot_name) = lookup("ECHOBOT_BOT_NAME") {
            self.bot_name = bot_name;
        }
        if let Some(conversation_id) = lookup("ECHOBOT_CONVERSATION_ID") {
            self.conversation_id = Some(conversation_id);
        }
        if let Some(announce) = lookup("ECHOBOT_ANNOUNCE_CONVERSATION") {
            self.announce_conversation = matches!(announce.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.channel_id.trim().is_empty() {
            return Err(anyhow::anyhow!("channel_id must not be empty"));
        }
        if self.user_id.trim().is_empty() {
            return Err(anyhow::anyhow!("user_id must not be empty"));
        }
        if self.bot_id.trim().is_empty() {
            return Err(anyhow::anyhow!("bot_id must not be empty"));
        }
        if let Some(conversation_id) = &self.conversation_id {
            if conversation_id.trim().is_empty() {
                return Err(anyhow::anyhow!("conversation_id must not be empty"));
            }
        }
        Ok(())
    }

    /// Reference for the single console conversation
    pub fn conversation_reference(&self) -> ConversationReference {
        let conversation_id = self
            .conversation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        ConversationReference {
            activity_id: None,
            user: Some(ChannelAccount::new(&self.user_id, &self.user_name)),
            bot: Some(ChannelAccount::new(&self.bot_id, &self.bot_name)),
            conversation: Some(ConversationAccount::new(conversation_id)),
            channel_id: Some(self.channel_id.clone()),
        }
    }
}
