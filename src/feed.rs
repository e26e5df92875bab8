//! Fetch side of the feed: one HTTP round trip to the GeoNet volcanic
//! alert level endpoint, parsed and filtered into feed entries.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::entry::VolcanoFeedEntry;
use crate::error::FeedError;
use crate::geojson::FeatureCollection;

pub const GEONET_VOLCANO_URL: &str = "https://api.geonet.org.nz/volcano/val";

#[derive(Debug, Clone, Copy)]
pub struct FetchConfig {
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Outcome of a successful fetch cycle.
#[derive(Debug)]
pub enum FetchUpdate {
    /// A fresh snapshot, in the order the feed presented it. May be empty.
    Entries(Vec<VolcanoFeedEntry>),
    /// The feed was reachable but reported nothing new (HTTP 304).
    NoData,
}

/// Client for the GeoNet NZ Volcanic Alert Level feed.
///
/// Holds the HTTP validators from the last successful fetch and sends
/// conditional requests, so an unchanged feed costs a 304 instead of a
/// full payload.
pub struct VolcanoFeed {
    client: Client,
    url: String,
    home_coordinates: (f64, f64),
    filter_radius: Option<f64>,
    config: FetchConfig,
    etag: Option<String>,
    last_modified: Option<String>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl VolcanoFeed {
    pub fn new(client: Client, home_coordinates: (f64, f64), filter_radius: Option<f64>) -> Self {
        Self {
            client,
            url: GEONET_VOLCANO_URL.to_owned(),
            home_coordinates,
            filter_radius,
            config: FetchConfig::default(),
            etag: None,
            last_modified: None,
            last_timestamp: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Timestamp the feed reported for its current content (parsed from
    /// `Last-Modified`), if it reported one.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }

    /// Performs one fetch-and-parse cycle.
    pub async fn update(&mut self) -> Result<FetchUpdate, FeedError> {
        let response = self.fetch().await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!(url = %self.url, "feed not modified since last fetch");
            return Ok(FetchUpdate::NoData);
        }
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        self.etag = header_value(&response, ETAG);
        self.last_modified = header_value(&response, LAST_MODIFIED);
        self.last_timestamp = self
            .last_modified
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map(|timestamp| timestamp.with_timezone(&Utc));

        let body = response.text().await?;
        let collection: FeatureCollection = serde_json::from_str(&body)?;

        let total = collection.features.len();
        let mut entries: Vec<VolcanoFeedEntry> = collection
            .features
            .into_iter()
            .filter_map(|feature| VolcanoFeedEntry::from_feature(feature, self.home_coordinates))
            .collect();
        if entries.len() < total {
            warn!(
                url = %self.url,
                skipped = total - entries.len(),
                "features without volcano id or point geometry skipped"
            );
        }

        if let Some(radius) = self.filter_radius {
            entries.retain(|entry| entry.distance_to_home <= radius);
        }

        Ok(FetchUpdate::Entries(entries))
    }

    async fn fetch(&self) -> Result<reqwest::Response, FeedError> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(&self.url);
            if let Some(etag) = self.etag.as_deref() {
                request = request.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = self.last_modified.as_deref() {
                request = request.header(IF_MODIFIED_SINCE, last_modified);
            }

            let response = tokio::time::timeout(self.config.request_timeout, request.send())
                .await
                .map_err(|_| FeedError::Timeout)??;

            if response.status().is_server_error() {
                if attempt >= self.config.max_retries {
                    return Err(FeedError::Status(response.status()));
                }
                warn!(
                    url = %self.url,
                    status = %response.status(),
                    attempt,
                    "server error, retrying after backoff"
                );
                tokio::time::sleep(self.config.retry_backoff).await;
                attempt += 1;
                continue;
            }

            return Ok(response);
        }
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

impl fmt::Display for VolcanoFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VolcanoFeed(home=({}, {}), url={}, radius=",
            self.home_coordinates.0, self.home_coordinates.1, self.url
        )?;
        match self.filter_radius {
            Some(radius) => write!(f, "{radius})"),
            None => write!(f, "none)"),
        }
    }
}
