use axum::{
    extract::{Path, State},
    Json,
};
use types::{Assignment, GroupId};

use crate::{error::ApiError, state::AppState};

#[utoipa::path(
    get,
    path = "/v1/groups/{group}/weeks/{week}/assignments",
    tag = "carpool",
    params(
        ("group" = String, Path, description = "Carpool group id"),
        ("week" = String, Path, description = "Monday of the week, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Assignments stored for the week", body = [Assignment]),
        (status = 400, description = "Malformed week")
    )
)]
pub async fn week(
    State(state): State<AppState>,
    Path((group, week)): Path<(GroupId, String)>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    Ok(Json(state.engine.week(&group, &week).await?))
}
