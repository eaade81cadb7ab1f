//! Calculator route handler.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use mathscribe_core::calculator::{self, model::AnalysisRequest, model::AnalysisResponse};
use tracing::{info, info_span, warn, Instrument};

use crate::state::AppState;

/// POST /calculate - Recognise and evaluate the expression in an image.
///
/// Always answers 200; failures are reported in the `status` field.
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Json<AnalysisResponse> {
    let request_id = uuid::Uuid::new_v4();

    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!(%request_id, error = %rejection.body_text(), "Rejected request body");
            return Json(AnalysisResponse::error(rejection.body_text()));
        }
    };

    let span = info_span!("calculate", %request_id, vars = request.dict_of_vars.len());
    async move {
        info!("Processing image");
        let response = calculator::process_request(state.model.as_ref(), &request).await;
        Json(response)
    }
    .instrument(span)
    .await
}
