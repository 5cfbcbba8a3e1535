use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::commission::locations::{ServiceLocation, SERVICE_LOCATIONS};
use crate::commission::{self, CommissionQuote};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/commission/quote", get(quote))
        .route("/locations", get(list_locations))
}

#[derive(Deserialize)]
pub struct QuoteParams {
    pub location_id: String,
    pub delivery_fee: f64,
}

async fn quote(Query(params): Query<QuoteParams>) -> Result<Json<CommissionQuote>, AppError> {
    if !commission::is_accepted_fee(params.delivery_fee) {
        return Err(AppError::BadRequest(format!(
            "delivery_fee must be between 0 and {}",
            commission::MAX_DELIVERY_FEE
        )));
    }

    Ok(Json(commission::quote(&params.location_id, params.delivery_fee)))
}

async fn list_locations() -> Json<&'static [ServiceLocation]> {
    Json(SERVICE_LOCATIONS)
}
