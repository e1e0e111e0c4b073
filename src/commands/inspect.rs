use thiserror::Error;
use tracing::info;

use crate::parameters::OutPutTokenFormat;
use crate::store::{Slot, StoreError, TokenStore};
use crate::token::TokenRecord;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("encoding output: `{0}`")]
    Encode(#[from] serde_json::Error),
}

/// Shows what a slot currently holds, e.g. to find out whether the last run failed.
pub struct InspectCommand<S> {
    store: S,
}

impl<S> InspectCommand<S>
where
    S: TokenStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inspect(&self, slot: Slot, format: OutPutTokenFormat) -> Result<String, InspectError> {
        let value = self.store.read(&slot)?;
        if value.is_empty() {
            info!(%slot, "slot is empty: never written or last authentication failed");
        }

        let record = TokenRecord::new(slot, value);
        match format {
            OutPutTokenFormat::Plain => Ok(record.value.as_str().to_string()),
            OutPutTokenFormat::Json => Ok(serde_json::to_string_pretty(&record)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use mockall::predicate::eq;

    use super::*;
    use crate::store::tests::MockTokenStore;
    use crate::token::AccessToken;

    fn slot() -> Slot {
        Slot::try_from("salesforce").unwrap()
    }

    fn store_holding(value: &'static str) -> MockTokenStore {
        let mut store = MockTokenStore::new();
        store
            .expect_read()
            .once()
            .with(eq(slot()))
            .returning(move |_| Ok(AccessToken::from(value)));
        store.expect_write().never();
        store
    }

    #[test]
    fn inspect_plain() {
        let output = InspectCommand::new(store_holding("abc123"))
            .inspect(slot(), OutPutTokenFormat::Plain)
            .unwrap();
        assert_eq!(output, "abc123");
    }

    #[test]
    fn inspect_empty_slot_json() {
        let output = InspectCommand::new(store_holding(""))
            .inspect(slot(), OutPutTokenFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"slot": "salesforce", "access_token": ""})
        );
    }

    #[test]
    fn inspect_store_failure() {
        let mut store = MockTokenStore::new();
        store
            .expect_read()
            .returning(|s| Err(StoreError::Read(s.to_string(), "Permission denied".into())));

        assert_matches!(
            InspectCommand::new(store).inspect(slot(), OutPutTokenFormat::Plain),
            Err(InspectError::Store(StoreError::Read(_, _)))
        );
    }
}
