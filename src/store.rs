use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::token::AccessToken;

pub mod file;

const MAX_SLOT_LEN: usize = 128;

#[derive(Error, Debug, PartialEq)]
pub enum SlotError {
    #[error("invalid slot name `{0}`: {1}")]
    Invalid(String, String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("reading slot `{0}`: `{1}`")]
    Read(String, String),
    #[error("writing slot `{0}`: `{1}`")]
    Write(String, String),
}

/// Logical name of a cached token, e.g. the service it belongs to.
///
/// Slot names end up as file names, so only a conservative character set is accepted.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slot(String);

impl Slot {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Slot {
    type Error = SlotError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| -> Result<Slot, SlotError> {
            Err(SlotError::Invalid(value.to_string(), reason.into()))
        };

        if value.is_empty() {
            return invalid("must not be empty");
        }
        if value.len() > MAX_SLOT_LEN {
            return invalid("too long");
        }
        if value.starts_with('.') {
            return invalid("must not start with '.'");
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return invalid("only ascii alphanumerics, '-', '_' and '.' are allowed");
        }
        Ok(Slot(value.to_string()))
    }
}

impl TryFrom<String> for Slot {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Slot::try_from(value.as_str())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable persistence of exactly one token per slot.
pub trait TokenStore {
    /// Returns the stored token, or an empty one if the slot was never written.
    fn read(&self, slot: &Slot) -> Result<AccessToken, StoreError>;

    /// Replaces the whole content of the slot with `value`.
    fn write(&self, slot: &Slot, value: &AccessToken) -> Result<(), StoreError>;
}
