use std::fmt;

use serde::{Deserialize, Serialize};

use crate::distance::haversine;
use crate::geojson::Feature;

pub const ATTRIBUTION: &str = "GeoNet Geological hazard information for New Zealand";

/// One volcano from the alert-level feed, positioned relative to the
/// configured home coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolcanoFeedEntry {
    pub external_id: String,
    pub title: String,
    /// New Zealand Volcanic Alert Level, 0 (no unrest) to 5.
    pub alert_level: i64,
    pub aviation_colour_code: Option<String>,
    pub activity: Option<String>,
    pub hazards: Option<String>,
    /// (latitude, longitude) in degrees.
    pub coordinates: (f64, f64),
    /// Distance from the home coordinates in kilometres.
    pub distance_to_home: f64,
}

impl VolcanoFeedEntry {
    /// Builds an entry from a raw feature. Returns `None` when the feature
    /// carries no volcano ID or no point geometry.
    pub(crate) fn from_feature(feature: Feature, home_coordinates: (f64, f64)) -> Option<Self> {
        let external_id = feature.properties.volcano_id?;
        let coordinates = feature.geometry.as_ref().and_then(|geometry| geometry.point())?;

        Some(Self {
            external_id,
            title: feature.properties.volcano_title.unwrap_or_default(),
            alert_level: feature.properties.level.unwrap_or(0),
            aviation_colour_code: feature.properties.acc,
            activity: feature.properties.activity,
            hazards: feature.properties.hazards,
            coordinates,
            distance_to_home: haversine(home_coordinates, coordinates),
        })
    }

    pub fn attribution(&self) -> &'static str {
        ATTRIBUTION
    }
}

impl fmt::Display for VolcanoFeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VolcanoFeedEntry(id={})", self.external_id)
    }
}
