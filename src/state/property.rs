//! Typed access to one property of a state bag

use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, sync::Arc};

use super::BotState;
use crate::{adapter::TurnContext, error::BotResult};

/// Reads and writes a single named property of a `BotState` bag as `T`.
///
/// A property that has never been set reads as `T::default()`, and that
/// default is stored so the next save includes it.
pub struct StatePropertyAccessor<T> {
    state: Arc<BotState>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StatePropertyAccessor<T> {
    pub(crate) fn new(state: Arc<BotState>, name: impl Into<String>) -> Self {
        Self {
            state,
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> StatePropertyAccessor<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    pub async fn get(&self, context: &mut TurnContext) -> BotResult<T> {
        match self.state.get_property_value(context, &self.name).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => {
                let value = T::default();
                self.set(context, &value).await?;
                Ok(value)
            }
        }
    }

    pub async fn set(&self, context: &mut TurnContext, value: &T) -> BotResult<()> {
        let value = serde_json::to_value(value)?;
        self.state.set_property_value(context, &self.name, value).await
    }

    pub async fn delete(&self, context: &mut TurnContext) -> BotResult<()> {
        self.state.delete_property_value(context, &self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapter::TestAdapter, error::BotError, state::MemoryStorage};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        visits: u32,
    }

    fn setup() -> (Arc<BotState>, Arc<TestAdapter>) {
        let state = Arc::new(BotState::for_user(Arc::new(MemoryStorage::new())));
        (state, Arc::new(TestAdapter::new()))
    }

    #[tokio::test]
    async fn test_missing_property_reads_default_and_stores_it() {
        let (state, adapter) = setup();
        let visits = state.create_property::<u64>("visits");
        assert_eq!(visits.name(), "visits");

        let mut ctx = TurnContext::new(adapter.clone(), adapter.make_message("hi"));
        assert_eq!(visits.get(&mut ctx).await.unwrap(), 0);
        assert_eq!(state.get(&ctx).unwrap()["visits"], 0);
    }

    #[tokio::test]
    async fn test_set_and_delete_structured_property() {
        let (state, adapter) = setup();
        let profile = state.create_property::<Profile>("profile");
        let mut ctx = TurnContext::new(adapter.clone(), adapter.make_message("hi"));

        let value = Profile {
            name: "Ada".to_string(),
            visits: 2,
        };
        profile.set(&mut ctx, &value).await.unwrap();
        assert_eq!(profile.get(&mut ctx).await.unwrap(), value);

        profile.delete(&mut ctx).await.unwrap();
        assert!(state.get(&ctx).unwrap().get("profile").is_none());
        assert_eq!(profile.get(&mut ctx).await.unwrap(), Profile::default());
    }

    #[tokio::test]
    async fn test_mistyped_value_is_a_serialization_error() {
        let (state, adapter) = setup();
        let mut ctx = TurnContext::new(adapter.clone(), adapter.make_message("hi"));
        state
            .set_property_value(&mut ctx, "visits", json!("lots"))
            .await
            .unwrap();

        let visits = state.create_property::<u64>("visits");
        let err = visits.get(&mut ctx).await.unwrap_err();
        assert!(matches!(err, BotError::Serialization(_)));
    }
}
