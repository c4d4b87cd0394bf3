//! Activity types exchanged between the user and the bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of activity. Unknown tags are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
    Event,
    Typing,
    Delay,
    EndOfConversation,
    Trace,
    Invoke,
    Other(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Message => "message",
            ActivityType::ConversationUpdate => "conversationUpdate",
            ActivityType::Event => "event",
            ActivityType::Typing => "typing",
            ActivityType::Delay => "delay",
            ActivityType::EndOfConversation => "endOfConversation",
            ActivityType::Trace => "trace",
            ActivityType::Invoke => "invoke",
            ActivityType::Other(name) => name,
        }
    }
}

impl From<&str> for ActivityType {
    fn from(value: &str) -> Self {
        match value {
            "message" => ActivityType::Message,
            "conversationUpdate" => ActivityType::ConversationUpdate,
            "event" => ActivityType::Event,
            "typing" => ActivityType::Typing,
            "delay" => ActivityType::Delay,
            "endOfConversation" => ActivityType::EndOfConversation,
            "trace" => ActivityType::Trace,
            "invoke" => ActivityType::Invoke,
            other => ActivityType::Other(other.to_string()),
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        ActivityType::from(value.as_str())
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user or bot taking part in a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_group: bool,
}

impl ConversationAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: false,
        }
    }
}

/// Everything needed to address a message into an existing conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReference {
    pub activity_id: Option<String>,
    pub user: Option<ChannelAccount>,
    pub bot: Option<ChannelAccount>,
    pub conversation: Option<ConversationAccount>,
    pub channel_id: Option<String>,
}

/// Returned by an adapter for every activity it sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub id: String,
}

/// A single unit of exchange in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

impl Activity {
    pub fn new(activity_type: ActivityType) -> Self {
        Self {
            activity_type,
            id: None,
            timestamp: None,
            channel_id: None,
            from: None,
            recipient: None,
            conversation: None,
            text: None,
            value: None,
            members_added: Vec::new(),
            reply_to_id: None,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(ActivityType::Message)
        }
    }

    /// A `delay` activity pauses the outgoing stream for `millis`
    pub fn delay(millis: u64) -> Self {
        Self {
            value: Some(serde_json::Value::from(millis)),
            ..Self::new(ActivityType::Delay)
        }
    }

    pub fn is_message(&self) -> bool {
        self.activity_type == ActivityType::Message
    }

    /// Reference to the conversation this activity arrived on, seen from the bot
    pub fn conversation_reference(&self) -> ConversationReference {
        ConversationReference {
            activity_id: self.id.clone(),
            user: self.from.clone(),
            bot: self.recipient.clone(),
            conversation: self.conversation.clone(),
            channel_id: self.channel_id.clone(),
        }
    }

    /// Address this activity into the referenced conversation.
    ///
    /// Outgoing activities are sent by the bot, so `from` becomes the bot and
    /// `recipient` the user. When `is_incoming` is set the direction is reversed.
    pub fn apply_conversation_reference(
        &mut self,
        reference: &ConversationReference,
        is_incoming: bool,
    ) {
        self.channel_id = reference.channel_id.clone();
        self.conversation = reference.conversation.clone();

        if is_incoming {
            self.from = reference.user.clone();
            self.recipient = reference.bot.clone();
            if reference.activity_id.is_some() {
                self.id = reference.activity_id.clone();
            }
        } else {
            self.from = reference.bot.clone();
            self.recipient = reference.user.clone();
            if reference.activity_id.is_some() {
                self.reply_to_id = reference.activity_id.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_tags() {
        assert_eq!(ActivityType::from("message"), ActivityType::Message);
        assert_eq!(
            ActivityType::from("conversationUpdate"),
            ActivityType::ConversationUpdate
        );
        assert_eq!(
            ActivityType::from("handoff"),
            ActivityType::Other("handoff".to_string())
        );
        assert_eq!(ActivityType::Other("handoff".into()).to_string(), "handoff");
        assert_eq!(ActivityType::EndOfConversation.to_string(), "endOfConversation");
    }

    #[test]
    fn test_activity_serializes_type_as_string() {
        let activity = Activity::message("hi");
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["text"], "hi");
        assert!(json.get("membersAdded").is_none());

        let parsed: Activity =
            serde_json::from_str(r#"{"type":"customEvent","channelId":"console"}"#).unwrap();
        assert_eq!(parsed.activity_type, ActivityType::Other("customEvent".into()));
        assert_eq!(parsed.channel_id.as_deref(), Some("console"));
        assert!(parsed.text.is_none());
    }

    #[test]
    fn test_apply_conversation_reference_for_reply() {
        let mut incoming = Activity::message("ping");
        incoming.id = Some("7".to_string());
        incoming.channel_id = Some("console".to_string());
        incoming.from = Some(ChannelAccount::new("user", "User"));
        incoming.recipient = Some(ChannelAccount::new("bot", "Bot"));
        incoming.conversation = Some(ConversationAccount::new("convo-1"));

        let reference = incoming.conversation_reference();
        let mut reply = Activity::message("pong");
        reply.apply_conversation_reference(&reference, false);

        assert_eq!(reply.from.as_ref().map(|a| a.id.as_str()), Some("bot"));
        assert_eq!(reply.recipient.as_ref().map(|a| a.id.as_str()), Some("user"));
        assert_eq!(reply.reply_to_id.as_deref(), Some("7"));
        assert_eq!(reply.conversation.as_ref().map(|c| c.id.as_str()), Some("convo-1"));
        assert!(reply.id.is_none());
    }
}
