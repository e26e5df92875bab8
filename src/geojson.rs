use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: VolcanoProperties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// Point position as (latitude, longitude). GeoJSON stores positions
    /// longitude-first; an optional third element carries elevation.
    pub fn point(&self) -> Option<(f64, f64)> {
        if self.kind != "Point" {
            return None;
        }
        match self.coordinates.as_slice() {
            [longitude, latitude, ..] => Some((*latitude, *longitude)),
            _ => None,
        }
    }
}

/// Properties of one feature in the GeoNet `volcano/val` collection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VolcanoProperties {
    #[serde(rename = "volcanoID")]
    pub volcano_id: Option<String>,
    #[serde(rename = "volcanoTitle")]
    pub volcano_title: Option<String>,
    pub level: Option<i64>,
    pub acc: Option<String>,
    pub activity: Option<String>,
    pub hazards: Option<String>,
}
