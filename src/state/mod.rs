//! Bot state and the storage behind it
//!
//! Storage holds JSON property bags by key. `BotState` derives the key from
//! the incoming activity, caches the bag in the turn context for the
//! duration of a turn, and writes it back when the turn ends.

mod bot_state;
mod memory;
mod property;
mod storage;

pub use bot_state::*;
pub use memory::*;
pub use property::*;
pub use storage::*;
