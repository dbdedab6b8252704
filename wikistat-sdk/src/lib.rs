//! Shared types for wikistat.
//!
//! The [`objects`] module holds the decoded feed payload, the language
//! classification rule and the JSON bodies of the query API. The `client`
//! feature adds a typed HTTP client for that API.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
