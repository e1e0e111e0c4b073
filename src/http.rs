//! Blocking HTTP transport shared by the validator and the authenticator.
pub mod client;
pub mod config;
