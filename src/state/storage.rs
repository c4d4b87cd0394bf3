//! Storage abstraction for bot state

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::BotResult;

/// E-tag that matches any stored version
pub const ANY_ETAG: &str = "*";

/// A stored property bag and the version tag it was read or written with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreItem {
    pub value: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
}

impl StoreItem {
    pub fn new(value: Map<String, Value>) -> Self {
        Self { value, e_tag: None }
    }

    /// Item that overwrites whatever is stored under its key
    pub fn overwrite(value: Map<String, Value>) -> Self {
        Self {
            value,
            e_tag: Some(ANY_ETAG.to_string()),
        }
    }
}

pub type StoreItems = HashMap<String, StoreItem>;

/// Key-value store for state property bags.
///
/// A write whose e-tag is missing or `*` always wins. A write carrying any
/// other e-tag fails with `BotError::EtagConflict` if the stored item has a
/// different one.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the items stored under `keys`; missing keys are left out
    async fn read(&self, keys: &[String]) -> BotResult<StoreItems>;

    async fn write(&self, changes: StoreItems) -> BotResult<()>;

    /// Remove items; keys that do not exist are ignored
    async fn delete(&self, keys: &[String]) -> BotResult<()>;
}
