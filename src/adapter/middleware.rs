//! Middleware pipeline

use async_trait::async_trait;
use std::sync::Arc;

use super::{TurnContext, TurnHandler};
use crate::error::BotResult;

/// A step that wraps the rest of the turn.
///
/// Call `next.run(context)` to continue; returning without calling it ends the
/// turn before the handler runs.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn on_turn(&self, context: &mut TurnContext, next: Next<'_>) -> BotResult<()>;
}

/// The remainder of the pipeline after the current middleware
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    handler: &'a dyn TurnHandler,
}

impl<'a> Next<'a> {
    pub async fn run(self, context: &mut TurnContext) -> BotResult<()> {
        match self.middleware.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    middleware: rest,
                    handler: self.handler,
                };
                current.on_turn(context, next).await
            }
            None => self.handler.on_turn(context).await,
        }
    }
}

/// Ordered collection of middleware run before the turn handler
#[derive(Default, Clone)]
pub struct MiddlewareSet {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append middleware; it runs after everything registered before it
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Run every middleware in order, then the handler
    pub async fn run_pipeline(
        &self,
        context: &mut TurnContext,
        handler: &dyn TurnHandler,
    ) -> BotResult<()> {
        Next {
            middleware: &self.middleware,
            handler,
        }
        .run(context)
        .await
    }
}
