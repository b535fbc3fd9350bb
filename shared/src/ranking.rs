use crate::{Coordinate, RankedTrail, ReferencePoint, TrailRecord};

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RankError {
    #[error("reference point ({lat}, {lon}) is not a valid coordinate")]
    InvalidReference { lat: f64, lon: f64 },
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // Rounding can push h marginally above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin()
}

/// Orders `trails` by great-circle distance from `reference`, nearest first.
///
/// Trails with a missing or out-of-range coordinate are left out of the
/// result. Equal distances keep their input order. With `Some(limit)` only
/// the first `limit` entries are returned; a limit past the end is not an
/// error.
///
/// # Errors
/// `RankError::InvalidReference` when the reference itself is not a valid
/// coordinate.
pub fn rank(
    trails: &[TrailRecord],
    reference: &ReferencePoint,
    limit: Option<usize>,
) -> Result<Vec<RankedTrail>, RankError> {
    let origin = reference.coordinate();
    if !origin.is_valid() {
        return Err(RankError::InvalidReference {
            lat: origin.lat,
            lon: origin.lon,
        });
    }

    let mut ranked: Vec<RankedTrail> = trails
        .iter()
        .filter_map(|trail| match trail.coordinate() {
            Ok(coord) => Some(RankedTrail {
                trail: trail.clone(),
                distance_km: haversine_km(origin, coord),
            }),
            Err(err) => {
                tracing::debug!(trail_id = trail.id, "excluding trail from ranking: {err}");
                None
            }
        })
        .collect();

    // `sort_by` is stable, so ties keep input order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    Ok(ranked)
}

pub fn nearest(
    trails: &[TrailRecord],
    reference: &ReferencePoint,
    count: usize,
) -> Result<Vec<RankedTrail>, RankError> {
    rank(trails, reference, Some(count))
}

pub fn sort_by_distance(
    trails: &[TrailRecord],
    reference: &ReferencePoint,
) -> Result<Vec<RankedTrail>, RankError> {
    rank(trails, reference, None)
}
