// Handlers for the trail directory API.
// Ranking always goes through shared::rank; handlers only pick the
// reference point and the limit.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::{ApiError, RankedTrailsResponse, ReferencePoint, TrailListResponse, TrailRecord};

use crate::{
    AppState,
    error::{TrailError, trail_error_to_api_error},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Query accepted by the ranking endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RankQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub name: Option<String>,
    pub limit: Option<usize>,
}

impl RankQuery {
    fn reference(&self, configured: &ReferencePoint) -> Result<ReferencePoint, TrailError> {
        match (self.lat, self.lng) {
            (None, None) => Ok(configured.clone()),
            (Some(lat), Some(lng)) => Ok(ReferencePoint::new(
                self.name.clone().unwrap_or_else(|| "Custom location".to_string()),
                lat,
                lng,
            )),
            _ => Err(TrailError::PartialReference),
        }
    }
}

/// GET /api/trails - every trail in catalog order
pub async fn list_trails(State(state): State<AppState>) -> Json<TrailListResponse> {
    Json(TrailListResponse {
        reference: state.reference.as_ref().clone(),
        trails: state.catalog.trails().to_vec(),
    })
}

/// GET /api/trails/:id
pub async fn get_trail(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<TrailRecord> {
    state
        .catalog
        .find(id)
        .cloned()
        .map(Json)
        .ok_or(TrailError::NotFound(id))
        .map_err(trail_error_to_api_error)
}

/// GET /api/nearby-trails - nearest few trails, `nearby_limit` unless overridden
pub async fn nearby_trails(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> ApiResult<RankedTrailsResponse> {
    let limit = query.limit.unwrap_or(state.nearby_limit);
    ranked_response(&state, &query, Some(limit)).map_err(trail_error_to_api_error)
}

/// GET /api/distance-sorted-trails - every mappable trail, nearest first
pub async fn distance_sorted_trails(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> ApiResult<RankedTrailsResponse> {
    ranked_response(&state, &query, query.limit).map_err(trail_error_to_api_error)
}

fn ranked_response(
    state: &AppState,
    query: &RankQuery,
    limit: Option<usize>,
) -> Result<Json<RankedTrailsResponse>, TrailError> {
    let reference = query.reference(&state.reference)?;
    let trails = shared::rank(state.catalog.trails(), &reference, limit)?;

    tracing::info!(
        "ranked {} of {} trails from {:?} ({:.4}, {:.4}), limit={:?}",
        trails.len(),
        state.catalog.len(),
        reference.name,
        reference.lat,
        reference.lng,
        limit
    );

    Ok(Json(RankedTrailsResponse { reference, trails }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_without_coordinates_uses_configured_reference() {
        let configured = ReferencePoint::default();
        let query = RankQuery::default();
        assert_eq!(query.reference(&configured).unwrap(), configured);
    }

    #[test]
    fn test_query_with_both_coordinates_overrides_reference() {
        let query = RankQuery {
            lat: Some(23.0),
            lng: Some(113.8),
            name: Some("Trailhead".into()),
            limit: None,
        };
        let reference = query.reference(&ReferencePoint::default()).unwrap();
        assert_eq!(reference, ReferencePoint::new("Trailhead", 23.0, 113.8));
    }

    #[test]
    fn test_query_with_one_coordinate_is_rejected() {
        let query = RankQuery {
            lat: Some(23.0),
            ..RankQuery::default()
        };
        assert!(matches!(
            query.reference(&ReferencePoint::default()),
            Err(TrailError::PartialReference)
        ));
    }
}
