use crate::{error::AppError, AppState};
use analytics::{validate_windows, PerformanceReport};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use configuration::WindowOverrides;
use std::sync::Arc;

/// # GET /strategy/performance
/// Scores the moving-average crossover over every stored closing price.
///
/// `short_window` and `long_window` may be given as query parameters; missing
/// ones fall back to the configured defaults. Malformed values are answered
/// with the same JSON error body as any other bad request.
pub async fn get_strategy_performance(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WindowOverrides>, QueryRejection>,
) -> Result<Json<PerformanceReport>, AppError> {
    let Query(overrides) = query?;
    let windows = overrides.resolve(state.analysis);
    // Reject bad windows before paying for the query.
    validate_windows(windows.short_window, windows.long_window)?;

    let series = state.db_repo.get_price_series().await?;
    let report = state
        .analyzer
        .analyze(series, windows.short_window, windows.long_window)?;

    tracing::info!(
        short_window = windows.short_window,
        long_window = windows.long_window,
        total_return = %report.total_return,
        "Served strategy performance"
    );
    Ok(Json(report))
}
