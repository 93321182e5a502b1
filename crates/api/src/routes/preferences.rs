use axum::{
    extract::{Path, State},
    Json,
};
use types::{GroupId, PreferenceSubmission, WeeklyPreference};

use crate::{error::ApiError, state::AppState};

#[utoipa::path(
    post,
    path = "/v1/groups/{group}/preferences",
    tag = "carpool",
    params(("group" = String, Path, description = "Carpool group id")),
    request_body = PreferenceSubmission,
    responses(
        (status = 200, description = "Preferences stored, replacing any earlier set", body = [WeeklyPreference]),
        (status = 400, description = "Rejected preference set")
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    Path(group): Path<GroupId>,
    Json(submission): Json<PreferenceSubmission>,
) -> Result<Json<Vec<WeeklyPreference>>, ApiError> {
    let stored = state.intake.submit(&group, submission).await?;
    Ok(Json(stored))
}
