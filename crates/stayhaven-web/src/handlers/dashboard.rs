//! Partner dashboard statistics.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use stayhaven_common::{ApiError, Role};
use stayhaven_db::{PropertyStatus, PropertyWithImages};

use crate::session::Session;
use crate::state::SharedState;

/// Months covered by the revenue chart, oldest first.
pub const REVENUE_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_properties: usize,
    pub active_listings: usize,
    pub avg_rating: Option<f64>,
    pub occupancy_rate: u32,
    pub upcoming_reservations: u32,
    pub revenue_series: Vec<f64>,
    pub revenue_this_month: f64,
}

/// Occupancy, reservations and revenue stay at zero until bookings exist.
pub fn compute_stats(properties: &[PropertyWithImages]) -> DashboardStats {
    let active_listings = properties
        .iter()
        .filter(|p| p.property.status == PropertyStatus::Published)
        .count();

    let ratings: Vec<f64> = properties.iter().filter_map(|p| p.property.rating).collect();
    let avg_rating = (!ratings.is_empty()).then(|| {
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        (mean * 10.0).round() / 10.0
    });

    let revenue_series = vec![0.0; REVENUE_MONTHS];
    let revenue_this_month = revenue_series.last().copied().unwrap_or(0.0);

    DashboardStats {
        total_properties: properties.len(),
        active_listings,
        avg_rating,
        occupancy_rate: 0,
        upcoming_reservations: 0,
        revenue_series,
        revenue_this_month,
    }
}

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<SharedState>, session: Session) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::Partner)?;
    let properties = state.properties.list_by_owner(session.user_id()).await?;
    Ok(Json(json!({ "ok": true, "stats": compute_stats(&properties) })))
}
