//! zkss - Zettelkasten smart search.
//!
//! This library searches a flat directory of notes two ways: a keyword
//! cascade that groups notes into tiers from the most exact filename match
//! down to loose content matches, and a semantic index kept in sync with the
//! directory by modification time.
//!
//! # Modules
//!
//! - [`commands`] - High-level operations (keyword search, semantic search, reindex, read)
//! - [`search`] - Query parsing, match predicates, and the cascade engine
//! - [`index`] - Embedder, vector store trait and implementations, index synchronizer
//! - [`storage`] - Note storage trait and implementations
//! - [`notes`] - Filename helpers shared by search and index
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod index;
pub mod notes;
pub mod search;
pub mod storage;

#[cfg(feature = "mcp")]
pub mod mcp;
