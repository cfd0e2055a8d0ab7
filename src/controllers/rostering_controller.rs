use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::dto::rostering_dto::{
    ApplyAssignmentsRequest, AutoAssignRequest, CheckConflictsRequest, ConflictScanResponse,
};
use crate::dto::ApiResponse;
use crate::models::{ApplyResult, AutoAssignResult, AvailabilityResult, ConflictReport, EntityType, WorkloadReport};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppError};

pub struct RosteringController {
    state: AppState,
}

impl RosteringController {
    pub fn new(state: &AppState) -> Self {
        Self {
            state: state.clone(),
        }
    }

    pub async fn check_conflicts(
        &self,
        tenant_id: Uuid,
        request: CheckConflictsRequest,
    ) -> Result<ApiResponse<ConflictReport>, AppError> {
        let candidate = request.into_candidate()?;
        let report = self.state.conflicts.check_conflicts(tenant_id, &candidate).await?;
        let message = report.message.clone();
        Ok(ApiResponse::success_with_message(report, message))
    }

    pub async fn scan_conflicts(
        &self,
        tenant_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ApiResponse<ConflictScanResponse>, AppError> {
        let trips = self.state.conflicts.scan_conflicts(tenant_id, start, end).await?;
        Ok(ApiResponse::success(ConflictScanResponse {
            start,
            end,
            trips_with_findings: trips.len(),
            trips,
        }))
    }

    pub async fn check_availability(
        &self,
        tenant_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
        date: NaiveDate,
    ) -> Result<ApiResponse<AvailabilityResult>, AppError> {
        let entity_type: EntityType = entity_type.parse().map_err(|e: String| bad_request_error(&e))?;
        let result = self
            .state
            .availability
            .check_availability(tenant_id, entity_type, entity_id, date)
            .await?;
        let message = result.reason.clone();
        Ok(ApiResponse::success_with_message(result, message))
    }

    pub async fn calculate_workload(
        &self,
        tenant_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ApiResponse<WorkloadReport>, AppError> {
        let report = self.state.workload.calculate_workload(tenant_id, start, end).await?;
        Ok(ApiResponse::success(report))
    }

    pub async fn auto_assign(
        &self,
        tenant_id: Uuid,
        request: AutoAssignRequest,
    ) -> Result<ApiResponse<AutoAssignResult>, AppError> {
        request.validate()?;
        let result = self
            .state
            .auto_assign
            .auto_assign(tenant_id, request.date, &request.options())
            .await?;
        let message = format!(
            "{} trip(s) proposed, {} left unassigned",
            result.assignments.len(),
            result.unassigned.len()
        );
        Ok(ApiResponse::success_with_message(result, message))
    }

    pub async fn apply_assignments(
        &self,
        tenant_id: Uuid,
        request: ApplyAssignmentsRequest,
    ) -> Result<ApiResponse<ApplyResult>, AppError> {
        request.validate()?;
        let result = self
            .state
            .auto_assign
            .apply_proposals(tenant_id, &request.proposals)
            .await?;

        if result.applied.is_empty() {
            return Err(AppError::Conflict(format!(
                "No proposal could be applied ({} rejected)",
                result.rejected.len()
            )));
        }

        let message = format!(
            "{} assignment(s) saved, {} rejected",
            result.applied.len(),
            result.rejected.len()
        );
        Ok(ApiResponse::success_with_message(result, message))
    }
}
