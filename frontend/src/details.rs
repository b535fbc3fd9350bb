use shared::TrailRecord;

/// Label/value rows for the trail details panel. Fields the record leaves
/// empty are skipped.
pub fn trail_detail_rows(trail: &TrailRecord) -> Vec<(&'static str, String)> {
    let features = trail.features_label();
    [
        ("Difficulty", trail.difficulty.as_str()),
        ("Route length", trail.route_length.as_str()),
        ("Duration", trail.duration.as_str()),
        ("Elevation gain", trail.elevation_gain.as_str()),
        ("Features", features.as_str()),
        ("Best time to visit", trail.best_time.as_str()),
        ("Getting there", trail.transportation.as_str()),
        ("Description", trail.description.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| (label, value.to_string()))
    .collect()
}
