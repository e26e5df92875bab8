//! Reconciliation core: keeps the durable set of known volcanoes in sync
//! with whatever the feed last reported, and tells the caller about it.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use reqwest::Client;
use tracing::{debug, warn};

use crate::entry::VolcanoFeedEntry;
use crate::feed::{FetchUpdate, VolcanoFeed};

/// Caller-supplied side effects, invoked once per affected external ID
/// per update cycle.
#[async_trait]
pub trait EntityHandler: Send + Sync {
    /// An ID appeared that was not known before.
    async fn generate(&self, external_id: &str);
    /// A known ID was re-presented by the feed; the stored entry has been
    /// replaced with the fresh one.
    async fn update(&self, external_id: &str);
    /// Present for symmetry with `generate`. Reconciliation never removes
    /// entries, so this is not invoked by the manager (see [`VolcanoFeedManager::update`]).
    async fn remove(&self, external_id: &str);
}

/// Owns a [`VolcanoFeed`] and the durable external ID → entry map that
/// survives across update cycles.
pub struct VolcanoFeedManager<H: EntityHandler> {
    feed: VolcanoFeed,
    handler: H,
    feed_entries: IndexMap<String, VolcanoFeedEntry>,
    last_update: Option<DateTime<Utc>>,
    last_update_successful: Option<DateTime<Utc>>,
}

impl<H: EntityHandler> VolcanoFeedManager<H> {
    pub fn new(
        client: Client,
        handler: H,
        home_coordinates: (f64, f64),
        filter_radius: Option<f64>,
    ) -> Self {
        Self::from_feed(VolcanoFeed::new(client, home_coordinates, filter_radius), handler)
    }

    /// Wraps a preconfigured feed, e.g. one pointed at a non-default URL.
    pub fn from_feed(feed: VolcanoFeed, handler: H) -> Self {
        Self {
            feed,
            handler,
            feed_entries: IndexMap::new(),
            last_update: None,
            last_update_successful: None,
        }
    }

    /// Runs one fetch cycle and reconciles the result.
    ///
    /// A failed fetch leaves the entry map untouched and fires no
    /// callbacks; the failure is visible only through
    /// [`last_update_successful`](Self::last_update_successful) standing
    /// still. A snapshot drives `generate` for unknown IDs and `update`
    /// for known ones, in snapshot order. IDs the snapshot no longer
    /// mentions are retained: upstream snapshots can be partial, so
    /// absence is not treated as removal.
    pub async fn update(&mut self) {
        let outcome = self.feed.update().await;
        self.last_update = Some(Utc::now());

        match outcome {
            Ok(FetchUpdate::Entries(entries)) => {
                self.last_update_successful = self.last_update;
                debug!(feed = %self.feed, count = entries.len(), "snapshot retrieved");
                self.reconcile(entries).await;
            }
            Ok(FetchUpdate::NoData) => {
                self.last_update_successful = self.last_update;
                debug!(feed = %self.feed, "update successful, nothing new reported");
            }
            Err(error) => {
                warn!(feed = %self.feed, error = %error, "update failed, keeping known entries");
            }
        }
    }

    async fn reconcile(&mut self, entries: Vec<VolcanoFeedEntry>) {
        let mut handled = HashSet::new();
        for entry in entries {
            let external_id = entry.external_id.clone();
            let known = self.feed_entries.insert(external_id.clone(), entry).is_some();
            if !handled.insert(external_id.clone()) {
                // Duplicate ID within one snapshot: the later entry wins,
                // the callback already fired.
                continue;
            }
            if known {
                self.handler.update(&external_id).await;
            } else {
                self.handler.generate(&external_id).await;
            }
        }
    }

    /// Known entries by external ID, in first-seen order.
    pub fn feed_entries(&self) -> &IndexMap<String, VolcanoFeedEntry> {
        &self.feed_entries
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_update_successful(&self) -> Option<DateTime<Utc>> {
        self.last_update_successful
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.feed.last_timestamp()
    }
}

impl<H: EntityHandler> fmt::Display for VolcanoFeedManager<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VolcanoFeedManager(feed={})", self.feed)
    }
}
