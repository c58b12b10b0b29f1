//! Link repository
//!
//! The `LinkRepository` owns the in-memory link collection for the session
//! and is the only way to change it. Every mutation rewrites the whole
//! collection to storage; a failed write is reported but never undone in
//! memory, so the session keeps working without persistence.
//!
//! ## Usage
//!
//! ```ignore
//! let mut repo = LinkRepository::open(config.open_storage());
//!
//! let saved = repo.add("Example", "", "example.com")?;
//! if let Some(err) = &saved.store_error {
//!     eprintln!("not persisted: {}", err);
//! }
//!
//! for link in repo.recent(3) {
//!     println!("{} {}", link.title, link.url);
//! }
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{LinkRecord, ValidationError};
use crate::storage::{KeyValueStorage, LinkStore, StoreError};

/// Number of links shown in the recent view unless configured otherwise
pub const DEFAULT_RECENT_COUNT: usize = 3;

/// Result of a mutation: the value, plus the storage failure if the
/// change could not be persisted
#[derive(Debug)]
pub struct Saved<T> {
    pub value: T,
    pub store_error: Option<StoreError>,
}

impl<T> Saved<T> {
    /// Whether the change reached durable storage
    pub fn is_persisted(&self) -> bool {
        self.store_error.is_none()
    }
}

/// In-memory link collection, newest first, backed by durable storage
#[derive(Debug)]
pub struct LinkRepository<S> {
    links: Vec<LinkRecord>,
    store: LinkStore<S>,
    persistent: bool,
}

impl<S: KeyValueStorage> LinkRepository<S> {
    /// Load the collection from storage (empty if absent or unreadable)
    pub fn open(storage: S) -> Self {
        let mut store = LinkStore::new(storage);
        let links = store.load();
        Self {
            links,
            store,
            persistent: true,
        }
    }

    /// Validate and insert a new link at the front of the collection
    pub fn add(
        &mut self,
        title: &str,
        description: &str,
        url: &str,
    ) -> Result<Saved<LinkRecord>, ValidationError> {
        self.add_at(title, description, url, Utc::now())
    }

    /// Same as [`add`](Self::add) with an explicit creation time
    pub fn add_at(
        &mut self,
        title: &str,
        description: &str,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Saved<LinkRecord>, ValidationError> {
        let mut link = LinkRecord::validate_at(title, description, url, now)?;

        // Two links created within the same millisecond would share an id
        if let Some(max_id) = self.links.iter().map(|l| l.id).max() {
            if link.id <= max_id {
                link.id = max_id + 1;
            }
        }

        self.links.insert(0, link.clone());
        debug!("Added link {} '{}'", link.id, link.title);

        let store_error = self.persist();
        Ok(Saved {
            value: link,
            store_error,
        })
    }

    /// Remove the link with `id`; removing a missing id is a no-op
    ///
    /// Returns the removed link, if there was one.
    pub fn remove(&mut self, id: i64) -> Saved<Option<LinkRecord>> {
        let removed = self
            .links
            .iter()
            .position(|l| l.id == id)
            .map(|pos| self.links.remove(pos));

        match &removed {
            Some(link) => debug!("Removed link {} '{}'", link.id, link.title),
            None => debug!("No link with id {} to remove", id),
        }

        let store_error = self.persist();
        Saved {
            value: removed,
            store_error,
        }
    }

    /// Links whose title contains `term`, ignoring case, newest first
    ///
    /// A blank term matches nothing. Any other term is matched as given,
    /// surrounding spaces included. The returned iterator is lazy and can
    /// be cloned to walk the results again.
    pub fn search<'a>(&'a self, term: &str) -> Search<'a> {
        let needle = if term.trim().is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        };

        Search {
            links: self.links.iter(),
            needle,
        }
    }

    /// The `n` newest links (fewer if the collection is smaller)
    pub fn recent(&self, n: usize) -> &[LinkRecord] {
        &self.links[..n.min(self.links.len())]
    }

    /// Every link, newest first
    pub fn all(&self) -> &[LinkRecord] {
        &self.links
    }

    /// Look up a link by id
    pub fn get(&self, id: i64) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Whether the last write reached durable storage
    ///
    /// Turns false after a failed save and back to true once a later save
    /// succeeds.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    fn persist(&mut self) -> Option<StoreError> {
        match self.store.save(&self.links) {
            Ok(()) => {
                if !self.persistent {
                    debug!("Storage recovered, collection persisted again");
                }
                self.persistent = true;
                None
            }
            Err(e) => {
                warn!("Keeping links in memory only: {}", e);
                self.persistent = false;
                Some(e)
            }
        }
    }
}

/// Lazy title search over a repository's links
#[derive(Debug, Clone)]
pub struct Search<'a> {
    links: std::slice::Iter<'a, LinkRecord>,
    needle: Option<String>,
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a LinkRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = self.needle.as_deref()?;
        self.links.by_ref().find(|link| link.title_contains(needle))
    }
}
