//! Linkshelf Core Library
//!
//! This crate provides the core functionality for Linkshelf, a small
//! personal bookmark shelf: saved links with a title, an optional
//! description and a creation time, kept in a local key-value store.
//!
//! # Architecture
//!
//! - **Storage**: a namespace of string slots (`links`, `theme`), the same
//!   model as browser local storage, injectable through [`KeyValueStorage`]
//!
//! All queries are served from the in-memory collection held by
//! [`LinkRepository`]; every mutation writes the whole collection back.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut repo = LinkRepository::open(config.open_storage());
//!
//! // Add a link
//! let saved = repo.add("Rust", "", "rust-lang.org")?;
//!
//! // Query links
//! let hits: Vec<_> = repo.search("rust").collect();
//! let recent = repo.recent(config.recent_count);
//! ```
//!
//! # Modules
//!
//! - `repository`: Link collection operations (main entry point)
//! - `models`: Link records and validation
//! - `storage`: Key-value slots and the link blob format
//! - `theme`: Light/dark preference
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod repository;
pub mod storage;
pub mod theme;

pub use config::Config;
pub use models::{Field, LinkRecord, ValidationError};
pub use repository::{LinkRepository, Saved, Search, DEFAULT_RECENT_COUNT};
pub use storage::{FileStorage, KeyValueStorage, LinkStore, MemoryStorage, StoreError};
pub use theme::{load_theme, save_theme, Theme, ThemeError};
