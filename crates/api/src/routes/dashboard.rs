//! Dashboard API routes

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use growth_analytics::Dashboard;

use crate::error::Result;
use crate::state::AppState;
use crate::types::DashboardParams;

/// Build the dashboard router
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET /api/dashboard - Graph, traffic and funnel sections for a date range
async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Dashboard>> {
    let request = params.to_request(&state, state.today())?;

    tracing::debug!(
        start = %request.range.start,
        end = %request.range.end,
        period = %request.period,
        reduction = request.reduction.as_str(),
        "building dashboard"
    );

    let dashboard = state.engine.build(&request).await?;
    Ok(Json(dashboard))
}
