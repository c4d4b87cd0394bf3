//! Activity schema
//!
//! The wire-level shapes that flow through a turn: activities, the accounts
//! that send and receive them, and conversation references used to reply.

mod activity;

pub use activity::*;
