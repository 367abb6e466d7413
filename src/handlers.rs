use actix_web::{web, HttpResponse};

use crate::artifacts::AppContext;
use crate::classifier;
use crate::error::PredictError;
use crate::models::{ErrorResponse, HealthResponse, PredictRequest, PredictResponse};
use crate::{fetch, preprocess};

/// Registers the HTTP surface. Malformed JSON bodies are turned into a 400
/// with the same `{"error": ...}` shape the predict errors use.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_cfg = web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse {
            error: format!("Invalid JSON payload: {err}"),
        };
        actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
            .into()
    });
    cfg.app_data(json_cfg)
        .service(web::resource("/").route(web::get().to(health)))
        .service(web::resource("/predict").route(web::post().to(predict)));
}

/// Liveness probe; never touches the model.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        message: "Waste classification service is running.",
    })
}

pub async fn predict(
    ctx: web::Data<AppContext>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse, PredictError> {
    let url = body
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            PredictError::InvalidRequest("Missing 'imageUrl' in JSON payload.".to_string())
        })?;

    // Checked before any fetch work: without a model nothing downstream
    // can succeed, and the failure is permanent until restart.
    let model = ctx
        .classifier
        .as_ref()
        .ok_or(PredictError::ModelUnavailable)?;

    let tmp = fetch::download_image(&ctx.http, url).await?;
    let scores = preprocess::tensor_from_file(tmp.path(), ctx.normalize_pixels)
        .and_then(|batch| model.scores(batch));
    // The temp file goes away whether preprocessing or inference worked or
    // not; a failed removal is logged and never overrides the response.
    if let Err(e) = tmp.close() {
        tracing::warn!("could not remove temporary image file: {e}");
    }
    let scores = scores?;

    let (classification, confidence) = classifier::top_prediction(&scores, &ctx.labels)
        .ok_or_else(|| PredictError::Inference("model produced an empty score vector".to_string()))?;
    tracing::info!(%classification, confidence, "prediction complete");
    Ok(HttpResponse::Ok().json(PredictResponse {
        classification,
        confidence,
    }))
}
