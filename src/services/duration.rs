//! Route duration estimation.
//!
//! The estimate is a nearest-neighbour lower bound, not a tour length: every
//! point contributes the great-circle distance to its closest other point in
//! the route, and the sum is converted to minutes at a fixed walking speed.
//!
//! Adding or removing a single point is handled incrementally by adjusting the
//! stored value with that point's own contribution only. Points whose nearest
//! neighbour changed are not revisited, so the stored duration drifts from
//! the full computation until [`route_duration_minutes`] is run again.

use crate::constants::AVERAGE_SPEED_KMH;
use crate::models::Coordinates;

/// Distance from `point` to the closest of `others`, `None` if there are none.
pub fn nearest_distance_km(point: &Coordinates, others: &[Coordinates]) -> Option<f64> {
    others
        .iter()
        .map(|other| point.distance_to(other))
        .min_by(f64::total_cmp)
}

/// Sum over all points of the distance to their nearest other point.
pub fn nearest_neighbour_sum_km(points: &[Coordinates]) -> f64 {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| point.distance_to(other))
                .min_by(f64::total_cmp)
        })
        .sum()
}

/// Travel time in whole minutes for `km` at the average speed.
pub fn minutes_for_distance(km: f64) -> i32 {
    (km / AVERAGE_SPEED_KMH * 60.0).round() as i32
}

/// Full estimate for a route. Zero for routes with fewer than two points.
pub fn route_duration_minutes(points: &[Coordinates]) -> i32 {
    minutes_for_distance(nearest_neighbour_sum_km(points))
}

/// Stored duration after `new_point` joins a route that already has `existing`.
pub fn duration_after_insert(current: i32, new_point: &Coordinates, existing: &[Coordinates]) -> i32 {
    let delta = nearest_distance_km(new_point, existing)
        .map(minutes_for_distance)
        .unwrap_or(0);
    current.saturating_add(delta)
}

/// Stored duration after `removed` leaves a route, `remaining` being the
/// points left behind. Never negative, and zero once fewer than two remain.
pub fn duration_after_removal(current: i32, removed: &Coordinates, remaining: &[Coordinates]) -> i32 {
    if remaining.len() < 2 {
        return 0;
    }
    let delta = nearest_distance_km(removed, remaining)
        .map(minutes_for_distance)
        .unwrap_or(0);
    current.saturating_sub(delta).max(0)
}
