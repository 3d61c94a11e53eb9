use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::payment::Payment;
use crate::state::AppState;

/// GET /users/me/payments/
pub async fn handle_list_my_payments(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE user_id = $1 ORDER BY date DESC, time DESC, id DESC",
    )
    .bind(caller.user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(payments))
}
