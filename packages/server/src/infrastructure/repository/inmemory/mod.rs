//! InMemory Repository 実装

pub mod client;

pub use client::InMemoryClientRepository;
