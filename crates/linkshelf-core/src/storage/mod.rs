//! Storage layer
//!
//! Durable state is a namespace of named string slots, the same model as
//! browser local storage:
//!
//! - `links`: JSON array holding the whole link collection
//! - `links.corrupt`: raw copy of a `links` blob that failed to parse
//! - `theme`: the theme preference (see [`crate::theme`])
//!
//! [`KeyValueStorage`] is the injectable capability; [`FileStorage`] is
//! the real one and [`MemoryStorage`] the fake. [`LinkStore`] translates
//! the link collection to and from its slot.

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::LinkRecord;

/// Slot holding the serialized link collection
pub const LINKS_SLOT: &str = "links";

/// Slot receiving an unparsable `links` blob before it gets overwritten
pub const CORRUPT_LINKS_SLOT: &str = "links.corrupt";

/// Synchronous key-value storage of string slots
pub trait KeyValueStorage {
    /// Read a slot, `None` if it was never written
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the contents of a slot in one step
    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a slot; deleting a missing slot succeeds
    fn remove_item(&mut self, key: &str) -> StoreResult<()>;
}

/// Serialize a collection into its stored form
pub fn encode_links(links: &[LinkRecord]) -> serde_json::Result<String> {
    serde_json::to_string(links)
}

/// Parse the stored form of a collection
pub fn decode_links(blob: &str) -> serde_json::Result<Vec<LinkRecord>> {
    serde_json::from_str(blob)
}

/// Reads and writes the link collection through a [`KeyValueStorage`]
#[derive(Debug)]
pub struct LinkStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> LinkStore<S> {
    /// Create an adapter over the given storage
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the collection, newest first
    ///
    /// Never fails: a missing, unreadable or unparsable slot yields an
    /// empty collection. An unparsable blob is copied to
    /// [`CORRUPT_LINKS_SLOT`] first so the next save does not destroy it.
    pub fn load(&mut self) -> Vec<LinkRecord> {
        let blob = match self.storage.get_item(LINKS_SLOT) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored links, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read stored links, starting empty: {}", e);
                return Vec::new();
            }
        };

        match decode_links(&blob) {
            Ok(links) => {
                let links = dedupe_ids(links);
                debug!("Loaded {} links", links.len());
                links
            }
            Err(e) => {
                warn!("Stored links are unparsable, starting empty: {}", e);
                if let Err(e) = self.storage.set_item(CORRUPT_LINKS_SLOT, &blob) {
                    warn!("Could not back up unparsable links: {}", e);
                }
                Vec::new()
            }
        }
    }

    /// Overwrite the stored collection with `links`
    pub fn save(&mut self, links: &[LinkRecord]) -> StoreResult<()> {
        let blob = encode_links(links).map_err(|e| StoreError::Unavailable {
            key: LINKS_SLOT.to_string(),
            reason: format!("could not serialize links: {}", e),
        })?;
        self.storage.set_item(LINKS_SLOT, &blob)?;
        debug!("Saved {} links", links.len());
        Ok(())
    }
}

/// Keep the first (newest) record for each id
fn dedupe_ids(links: Vec<LinkRecord>) -> Vec<LinkRecord> {
    let total = links.len();
    let mut seen = HashSet::with_capacity(total);
    let links: Vec<LinkRecord> = links.into_iter().filter(|l| seen.insert(l.id)).collect();

    if links.len() != total {
        warn!(
            "Dropped {} stored links with duplicate ids",
            total - links.len()
        );
    }
    links
}
