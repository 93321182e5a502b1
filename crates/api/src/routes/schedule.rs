use axum::{
    extract::{Path, State},
    Json,
};
use types::{GenerateRequest, GenerateSummary, GroupId};

use crate::{error::ApiError, state::AppState};

#[utoipa::path(
    post,
    path = "/v1/groups/{group}/schedule",
    tag = "carpool",
    params(("group" = String, Path, description = "Carpool group id")),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Week scheduled", body = GenerateSummary),
        (status = 400, description = "Malformed week or slot catalog"),
        (status = 409, description = "Week already scheduled"),
        (status = 500, description = "A data source is unavailable")
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    Path(group): Path<GroupId>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateSummary>, ApiError> {
    let summary = state.engine.handle(&group, &request).await?;
    Ok(Json(summary))
}
