//! Retrieval-augmented support assistant.
//!
//! Answers questions over a local document corpus and relays the answers to
//! Intercom conversations. Embedding, vector search and generation sit behind
//! the ports in [`domain::ports`].

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;
