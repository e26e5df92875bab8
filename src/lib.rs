pub mod distance;
pub mod entry;
pub mod error;
pub mod feed;
pub mod geojson;
pub mod manager;

pub use entry::{VolcanoFeedEntry, ATTRIBUTION};
pub use error::FeedError;
pub use feed::{FetchConfig, FetchUpdate, VolcanoFeed, GEONET_VOLCANO_URL};
pub use manager::{EntityHandler, VolcanoFeedManager};
