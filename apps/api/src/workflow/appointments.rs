use axum::{
    extract::{Query, State},
    Json,
};
use sqlx::QueryBuilder;

use super::{push_scope, MineQuery};
use crate::auth::permissions::list_scope;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::interview::{AppointmentRow, AppointmentView, APPOINTMENT_SELECT};
use crate::state::AppState;

/// GET /appointments/
///
/// Latest-scheduled first.
pub async fn handle_list_appointments(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<MineQuery>,
) -> Result<Json<Vec<AppointmentView>>, AppError> {
    let mut qb = QueryBuilder::new(APPOINTMENT_SELECT);
    qb.push(" WHERE TRUE");
    push_scope(&mut qb, list_scope(&caller, params.requested()));
    qb.push(" ORDER BY p.date DESC, p.time DESC, p.created_at DESC");

    let rows = qb
        .build_query_as::<AppointmentRow>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(AppointmentView::from).collect()))
}
