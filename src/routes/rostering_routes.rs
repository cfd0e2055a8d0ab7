use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::rostering_controller::RosteringController;
use crate::dto::rostering_dto::{
    ApplyAssignmentsRequest, AutoAssignRequest, AvailabilityQuery, CheckConflictsRequest, ConflictScanResponse,
    DateRangeQuery,
};
use crate::dto::ApiResponse;
use crate::models::{ApplyResult, AutoAssignResult, AvailabilityResult, ConflictReport, WorkloadReport};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas anidadas bajo `/api/tenants/:tenant_id`
pub fn create_rostering_router() -> Router<AppState> {
    Router::new()
        .route("/conflicts/check", post(check_conflicts))
        .route("/conflicts", get(scan_conflicts))
        .route("/availability/:entity_type/:entity_id", get(check_availability))
        .route("/workload", get(calculate_workload))
        .route("/auto-assign", post(auto_assign))
        .route("/auto-assign/apply", post(apply_assignments))
}

async fn check_conflicts(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<CheckConflictsRequest>,
) -> Result<Json<ApiResponse<ConflictReport>>, AppError> {
    let controller = RosteringController::new(&state);
    let response = controller.check_conflicts(tenant_id, request).await?;
    Ok(Json(response))
}

async fn scan_conflicts(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ApiResponse<ConflictScanResponse>>, AppError> {
    let controller = RosteringController::new(&state);
    let response = controller.scan_conflicts(tenant_id, range.start, range.end).await?;
    Ok(Json(response))
}

async fn check_availability(
    State(state): State<AppState>,
    Path((tenant_id, entity_type, entity_id)): Path<(Uuid, String, Uuid)>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilityResult>>, AppError> {
    let controller = RosteringController::new(&state);
    let response = controller
        .check_availability(tenant_id, &entity_type, entity_id, query.date)
        .await?;
    Ok(Json(response))
}

async fn calculate_workload(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ApiResponse<WorkloadReport>>, AppError> {
    let controller = RosteringController::new(&state);
    let response = controller.calculate_workload(tenant_id, range.start, range.end).await?;
    Ok(Json(response))
}

async fn auto_assign(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<AutoAssignRequest>,
) -> Result<Json<ApiResponse<AutoAssignResult>>, AppError> {
    let controller = RosteringController::new(&state);
    let response = controller.auto_assign(tenant_id, request).await?;
    Ok(Json(response))
}

async fn apply_assignments(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<ApplyAssignmentsRequest>,
) -> Result<Json<ApiResponse<ApplyResult>>, AppError> {
    let controller = RosteringController::new(&state);
    let response = controller.apply_assignments(tenant_id, request).await?;
    Ok(Json(response))
}
