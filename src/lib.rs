//! A console echo bot and the small turn pipeline it runs on.
//!
//! Lines read from the terminal become message activities. Each one passes
//! through the adapter's middleware (conversation state loads and saves the
//! per-conversation bag) to the [`bot::EchoBot`] turn handler, whose replies
//! are written back to the terminal.

pub mod adapter;
pub mod app;
pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod schema;
pub mod state;
