//! Adapters and the turn pipeline
//!
//! An adapter turns raw input into activities, runs each one through the
//! registered middleware and the bot's turn handler, and delivers whatever the
//! bot sends back.

mod console;
mod middleware;
mod turn_context;

#[cfg(test)]
mod test_adapter;

pub use console::*;
pub use middleware::*;
pub use turn_context::*;

#[cfg(test)]
pub use test_adapter::TestAdapter;

use async_trait::async_trait;

use crate::{
    error::BotResult,
    schema::{Activity, ResourceResponse},
};

/// Delivers outgoing activities to the channel
#[async_trait]
pub trait BotAdapter: Send + Sync {
    /// Send activities in order, returning one response per activity
    async fn send_activities(&self, activities: &[Activity]) -> BotResult<Vec<ResourceResponse>>;
}

/// Application logic invoked once per incoming activity
#[async_trait]
pub trait TurnHandler: Send + Sync {
    async fn on_turn(&self, context: &mut TurnContext) -> BotResult<()>;
}
