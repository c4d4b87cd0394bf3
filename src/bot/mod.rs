//! Turn handlers

mod echo;

pub use echo::*;
