use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::Slot;

/// Opaque bearer token. The empty string stands for "no token".
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> From<S> for AccessToken {
    fn from(value: S) -> Self {
        AccessToken(value.as_ref().to_string())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "AccessToken: empty")
        } else {
            write!(f, "AccessToken: redacted")
        }
    }
}

/// The cached credential as it lives in a store slot.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TokenRecord {
    pub slot: Slot,
    #[serde(rename = "access_token")]
    pub value: AccessToken,
}

impl TokenRecord {
    pub fn new(slot: Slot, value: AccessToken) -> Self {
        Self { slot, value }
    }
}
