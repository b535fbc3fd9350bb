use serde::{Deserialize, Deserializer, Serialize};

pub mod ranking;

pub use ranking::{EARTH_RADIUS_KM, RankError, haversine_km, nearest, rank, sort_by_distance};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// NaN and infinities fall outside both ranges, so they are never valid.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinate is missing")]
    Missing,
    #[error("coordinate ({lat}, {lon}) is outside the valid range")]
    OutOfRange { lat: f64, lon: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default, deserialize_with = "features_from_text_or_list")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "coordinate_or_missing")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "coordinate_or_missing")]
    pub lng: Option<f64>,
    /// Length of the walk as a display label, e.g. "8.4 km loop".
    #[serde(default)]
    pub route_length: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub elevation_gain: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub best_time: String,
    #[serde(default)]
    pub transportation: String,
}

impl TrailRecord {
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        let (Some(lat), Some(lon)) = (self.lat, self.lng) else {
            return Err(CoordinateError::Missing);
        };
        let coord = Coordinate { lat, lon };
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(CoordinateError::OutOfRange { lat, lon })
        }
    }

    pub fn features_label(&self) -> String {
        self.features.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl ReferencePoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lng,
        }
    }
}

impl Default for ReferencePoint {
    // Xiangmang East Road, Dongguan
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_NAME, 22.9907, 113.7378)
    }
}

pub const DEFAULT_REFERENCE_NAME: &str = "Xiangmang East Road, Dongguan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTrail {
    pub trail: TrailRecord,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailListResponse {
    pub reference: ReferencePoint,
    pub trails: Vec<TrailRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTrailsResponse {
    pub reference: ReferencePoint,
    pub trails: Vec<RankedTrail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeaturesRepr {
    List(Vec<String>),
    Text(String),
}

fn features_from_text_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FeaturesRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(FeaturesRepr::List(list)) => list,
        Some(FeaturesRepr::Text(text)) if text.trim().is_empty() => Vec::new(),
        Some(FeaturesRepr::Text(text)) => vec![text],
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Anything that is not a number (or a numeric string) counts as missing, so
/// one bad record is left out of ranking instead of failing the whole list.
fn coordinate_or_missing<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CoordinateRepr::deserialize(deserializer)? {
        CoordinateRepr::Number(value) => Some(value),
        CoordinateRepr::Text(text) => text.trim().parse().ok(),
        CoordinateRepr::Other(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> TrailRecord {
        serde_json::from_value(value).expect("trail record")
    }

    #[test]
    fn features_accept_list_or_single_text() {
        let listed = record(json!({
            "id": 1,
            "name": "Huangqi Mountain",
            "features": ["lanterns", "temple"],
            "lat": 23.0222,
            "lng": 113.7574
        }));
        assert_eq!(listed.features, vec!["lanterns", "temple"]);

        let text = record(json!({
            "id": 2,
            "name": "Yinping Mountain",
            "features": "highest peak in Dongguan",
            "lat": 22.95,
            "lng": 113.82
        }));
        assert_eq!(text.features, vec!["highest peak in Dongguan"]);
        assert_eq!(text.features_label(), "highest peak in Dongguan");
    }

    #[test]
    fn null_features_mean_no_features() {
        let trail = record(json!({"id": 6, "name": "Quiet", "features": null}));
        assert!(trail.features.is_empty());
    }

    #[test]
    fn unparsable_coordinate_is_treated_as_missing() {
        let trails: Vec<TrailRecord> = serde_json::from_value(json!([
            {"id": 1, "name": "Unknown spot", "lat": "unknown", "lng": 113.75},
            {"id": 2, "name": "Null lng", "lat": 23.0, "lng": null},
            {"id": 3, "name": "Text numbers", "lat": " 23.02", "lng": "113.75"},
            {"id": 4, "name": "Fine", "lat": 22.99, "lng": 113.74}
        ]))
        .expect("one bad coordinate must not fail the list");

        assert_eq!(trails[0].coordinate(), Err(CoordinateError::Missing));
        assert_eq!(trails[1].coordinate(), Err(CoordinateError::Missing));
        assert_eq!(trails[2].coordinate(), Ok(Coordinate::new(23.02, 113.75)));

        let ranked = rank(&trails, &ReferencePoint::default(), None).unwrap();
        let ids: Vec<u32> = ranked.iter().map(|r| r.trail.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn descriptive_fields_default_to_empty() {
        let trail = record(json!({"id": 3, "name": "Bare"}));
        assert!(trail.difficulty.is_empty());
        assert!(trail.features.is_empty());
        assert!(trail.duration.is_empty());
        assert_eq!(trail.lat, None);
    }

    #[test]
    fn missing_coordinate_is_reported() {
        let trail = record(json!({"id": 4, "name": "No lng", "lat": 23.0}));
        assert_eq!(trail.coordinate(), Err(CoordinateError::Missing));
    }

    #[test]
    fn out_of_range_coordinate_is_reported() {
        let trail = record(json!({"id": 5, "name": "North of north", "lat": 91.0, "lng": 113.0}));
        assert_eq!(
            trail.coordinate(),
            Err(CoordinateError::OutOfRange {
                lat: 91.0,
                lon: 113.0
            })
        );
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn default_reference_is_xiangmang_road() {
        let reference = ReferencePoint::default();
        assert_eq!(reference.name, DEFAULT_REFERENCE_NAME);
        assert_eq!(reference.coordinate(), Coordinate::new(22.9907, 113.7378));
    }
}
